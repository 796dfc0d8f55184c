//! Prose records: transcripts, reports and storage inspections

use serde::{Deserialize, Serialize};

use super::inventory::InventoryItem;
use crate::domain::inference::{Language, Provenance};

/// Verbatim transcription of a voice note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
}

/// Markdown report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeReport {
    pub markdown: String,
    pub grounded_on_local_data: bool,
}

impl NarrativeReport {
    pub fn new(markdown: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            markdown: markdown.into(),
            grounded_on_local_data: provenance == Provenance::LocalContext,
        }
    }

    /// Acceptance slip issued after a label scan registers a new item
    pub fn acceptance_slip(item: &InventoryItem, language: Language) -> Self {
        let markdown = match language {
            Language::Zh => format!(
                concat!(
                    "### 验收单生成成功\n\n已成功识别物料：**{}**\n",
                    "- 规格：{}\n- 品牌：{}\n- 数量：{} {}\n- 有效期至：{}",
                ),
                item.name, item.spec, item.brand, item.quantity, item.unit, item.expiry_date
            ),
            Language::En => format!(
                concat!(
                    "### Acceptance Slip Generated\n\nIdentified: **{}**\n",
                    "- Spec: {}\n- Brand: {}\n- Quantity: {} {}\n- Expires: {}",
                ),
                item.name, item.spec, item.brand, item.quantity, item.unit, item.expiry_date
            ),
        };
        Self {
            markdown,
            grounded_on_local_data: false,
        }
    }
}

/// Verdict from a camera frame of stored material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionReport {
    pub status: String,
    pub details: String,
}

impl InspectionReport {
    pub fn to_markdown(&self, language: Language) -> String {
        let title = match language {
            Language::Zh => "图像监控分析报告",
            Language::En => "Storage Inspection Report",
        };
        format!("### {}\n\n**{}**\n\n{}", title, self.status, self.details)
    }
}
