//! Captured media value objects

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::domain::error::UnsupportedMediaError;

/// Which device a capture acquires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CaptureKind {
    /// Microphone
    Audio,
    /// Camera (a still frame is taken at stop)
    Video,
}

impl CaptureKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

impl fmt::Display for CaptureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported MIME types for inline media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaMimeType {
    Flac,
    Ogg,
    Wav,
    Webm,
    Mp3,
    Jpeg,
    Png,
    Webp,
}

impl MediaMimeType {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Flac => "audio/flac",
            Self::Ogg => "audio/ogg",
            Self::Wav => "audio/wav",
            Self::Webm => "audio/webm",
            Self::Mp3 => "audio/mp3",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// The capture kind this media type belongs to
    pub const fn capture_kind(&self) -> CaptureKind {
        match self {
            Self::Flac | Self::Ogg | Self::Wav | Self::Webm | Self::Mp3 => CaptureKind::Audio,
            Self::Jpeg | Self::Png | Self::Webp => CaptureKind::Video,
        }
    }

    /// Guess the media type from a file extension
    pub fn from_path(path: &Path) -> Result<Self, UnsupportedMediaError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "flac" => Ok(Self::Flac),
            "ogg" | "opus" => Ok(Self::Ogg),
            "wav" => Ok(Self::Wav),
            "webm" => Ok(Self::Webm),
            "mp3" => Ok(Self::Mp3),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            _ => Err(UnsupportedMediaError {
                input: path.display().to_string(),
            }),
        }
    }
}

impl fmt::Display for MediaMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw media produced when a capture stops.
///
/// Moved into the payload encoder exactly once; nothing keeps a copy.
#[derive(Debug)]
pub struct CapturedMedia {
    data: Vec<u8>,
    mime_type: MediaMimeType,
    captured_at: DateTime<Utc>,
}

impl CapturedMedia {
    pub fn new(data: Vec<u8>, mime_type: MediaMimeType) -> Self {
        Self {
            data,
            mime_type,
            captured_at: Utc::now(),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> MediaMimeType {
        self.mime_type
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Human-readable size, e.g. `12.4 KB`
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }

    pub fn into_parts(self) -> (Vec<u8>, MediaMimeType) {
        (self.data, self.mime_type)
    }
}

/// Transport-safe (base64) media, ready to be inlined into a provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMedia {
    data: String,
    mime_type: MediaMimeType,
}

impl EncodedMedia {
    pub fn new(data: String, mime_type: MediaMimeType) -> Self {
        Self { data, mime_type }
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn mime_type(&self) -> MediaMimeType {
        self.mime_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn mime_type_from_extension() {
        assert_eq!(
            MediaMimeType::from_path(&PathBuf::from("label.JPG")).unwrap(),
            MediaMimeType::Jpeg
        );
        assert_eq!(
            MediaMimeType::from_path(&PathBuf::from("note.flac")).unwrap(),
            MediaMimeType::Flac
        );
        assert!(MediaMimeType::from_path(&PathBuf::from("slip.pdf")).is_err());
        assert!(MediaMimeType::from_path(&PathBuf::from("noext")).is_err());
    }

    #[test]
    fn mime_type_capture_kind() {
        assert_eq!(MediaMimeType::Webm.capture_kind(), CaptureKind::Audio);
        assert_eq!(MediaMimeType::Png.capture_kind(), CaptureKind::Video);
    }

    #[test]
    fn human_readable_size() {
        assert_eq!(
            CapturedMedia::new(vec![0; 500], MediaMimeType::Flac).human_readable_size(),
            "500 B"
        );
        assert_eq!(
            CapturedMedia::new(vec![0; 3072], MediaMimeType::Flac).human_readable_size(),
            "3.0 KB"
        );
    }

    #[test]
    fn empty_media() {
        let media = CapturedMedia::new(Vec::new(), MediaMimeType::Flac);
        assert!(media.is_empty());
        assert!(media.captured_at() <= Utc::now());
    }
}
