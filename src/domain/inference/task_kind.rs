//! Task kind value object

use std::fmt;

/// Category of a requested inference action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Recommendation,
    Transcription,
    Extraction,
    ImageAnalysis,
    NarrativeReport,
}

/// All task kinds
pub const ALL_TASK_KINDS: &[TaskKind] = &[
    TaskKind::Recommendation,
    TaskKind::Transcription,
    TaskKind::Extraction,
    TaskKind::ImageAnalysis,
    TaskKind::NarrativeReport,
];

impl TaskKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recommendation => "recommendation",
            Self::Transcription => "transcription",
            Self::Extraction => "extraction",
            Self::ImageAnalysis => "image-analysis",
            Self::NarrativeReport => "narrative-report",
        }
    }

    /// Whether the provider must answer with structured JSON
    pub const fn is_structured(&self) -> bool {
        matches!(
            self,
            Self::Recommendation | Self::Extraction | Self::ImageAnalysis
        )
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_kinds() {
        assert!(TaskKind::Recommendation.is_structured());
        assert!(TaskKind::Extraction.is_structured());
        assert!(TaskKind::ImageAnalysis.is_structured());
        assert!(!TaskKind::Transcription.is_structured());
        assert!(!TaskKind::NarrativeReport.is_structured());
    }

    #[test]
    fn display_uses_kebab_case() {
        assert_eq!(TaskKind::ImageAnalysis.to_string(), "image-analysis");
        assert_eq!(ALL_TASK_KINDS.len(), 5);
    }
}
