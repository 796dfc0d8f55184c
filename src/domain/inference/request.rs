//! Inference request value object

use super::language::Language;
use super::template::{PromptTemplate, TemplateInput};
use super::task_kind::TaskKind;
use crate::domain::capture::{CaptureKind, EncodedMedia};
use crate::domain::error::InvalidRequestError;
use crate::domain::records::InventoryItem;

/// Local lab data the prompt is grounded on
#[derive(Debug, Clone, Default, PartialEq)]
pub enum LocalContext {
    #[default]
    None,
    /// Precursor names available in the local library
    Precursors(Vec<String>),
    /// Current inventory snapshot
    Inventory(Vec<InventoryItem>),
}

impl LocalContext {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn precursors(&self) -> &[String] {
        match self {
            Self::Precursors(names) => names,
            _ => &[],
        }
    }

    pub fn inventory(&self) -> &[InventoryItem] {
        match self {
            Self::Inventory(items) => items,
            _ => &[],
        }
    }
}

/// One fully specified inference call. Immutable once built.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    template: PromptTemplate,
    text: Option<String>,
    media: Option<EncodedMedia>,
    language: Language,
    context: LocalContext,
}

impl InferenceRequest {
    /// Build a request from typed text
    pub fn from_text(
        template: PromptTemplate,
        text: impl Into<String>,
        language: Language,
        context: LocalContext,
    ) -> Result<Self, InvalidRequestError> {
        if template.input() != TemplateInput::Text {
            return Err(wrong_input(template));
        }
        let text = text.into();
        if text.trim().is_empty() {
            return Err(InvalidRequestError::BlankText {
                template: template.as_str(),
            });
        }
        Ok(Self {
            template,
            text: Some(text.trim().to_string()),
            media: None,
            language,
            context,
        })
    }

    /// Build a request from encoded media
    pub fn from_media(
        template: PromptTemplate,
        media: EncodedMedia,
        language: Language,
    ) -> Result<Self, InvalidRequestError> {
        let expected = match template.input() {
            TemplateInput::Audio => CaptureKind::Audio,
            TemplateInput::Image => CaptureKind::Video,
            _ => return Err(wrong_input(template)),
        };
        if media.mime_type().capture_kind() != expected {
            return Err(wrong_input(template));
        }
        Ok(Self {
            template,
            text: None,
            media: Some(media),
            language,
            context: LocalContext::None,
        })
    }

    /// Build a request whose prompt is derived from local context only
    pub fn from_context(
        template: PromptTemplate,
        context: LocalContext,
        language: Language,
    ) -> Result<Self, InvalidRequestError> {
        if template.input() != TemplateInput::Context {
            return Err(wrong_input(template));
        }
        Ok(Self {
            template,
            text: None,
            media: None,
            language,
            context,
        })
    }

    pub fn template(&self) -> PromptTemplate {
        self.template
    }

    pub fn kind(&self) -> TaskKind {
        self.template.kind()
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn media(&self) -> Option<&EncodedMedia> {
        self.media.as_ref()
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn context(&self) -> &LocalContext {
        &self.context
    }

    /// Prompt text for this request
    pub fn prompt(&self) -> String {
        self.template
            .render(self.text.as_deref(), &self.context, self.language)
    }
}

fn wrong_input(template: PromptTemplate) -> InvalidRequestError {
    let expected = match template.input() {
        TemplateInput::Text => "text",
        TemplateInput::Audio => "audio",
        TemplateInput::Image => "image",
        TemplateInput::Context => "no user",
    };
    InvalidRequestError::WrongInput {
        template: template.as_str(),
        expected,
    }
}
