//! Per-slot action state machine

use std::fmt;
use thiserror::Error;

use crate::domain::inference::PromptTemplate;

/// Independent UI action slots; each owns its own state and result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionSlot {
    Recommendation,
    TicketDictation,
    TicketAnalysis,
    InventoryVoice,
    LabelScan,
    StorageInspection,
    Report,
}

impl ActionSlot {
    pub const fn for_template(template: PromptTemplate) -> Self {
        match template {
            PromptTemplate::ProcessRecommendation => Self::Recommendation,
            PromptTemplate::FaultTranscription => Self::TicketDictation,
            PromptTemplate::TicketExtraction => Self::TicketAnalysis,
            PromptTemplate::InventoryVoiceEntry => Self::InventoryVoice,
            PromptTemplate::InventoryLabelScan => Self::LabelScan,
            PromptTemplate::StorageInspection => Self::StorageInspection,
            PromptTemplate::InventoryReport | PromptTemplate::LabAnalyticsReport => Self::Report,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recommendation => "recommendation",
            Self::TicketDictation => "ticket-dictation",
            Self::TicketAnalysis => "ticket-analysis",
            Self::InventoryVoice => "inventory-voice",
            Self::LabelScan => "label-scan",
            Self::StorageInspection => "storage-inspection",
            Self::Report => "report",
        }
    }
}

impl fmt::Display for ActionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an action ended without a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    PermissionDenied,
    Capture,
    Encoding,
    InferenceTransport,
    InferenceParse,
    InferenceEmpty,
    IncompleteRecord,
}

impl FailureKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission denied",
            Self::Capture => "capture failed",
            Self::Encoding => "encoding failed",
            Self::InferenceTransport => "provider unreachable",
            Self::InferenceParse => "unreadable answer",
            Self::InferenceEmpty => "empty answer",
            Self::IncompleteRecord => "no result",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    Failed(FailureKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActionState {
    #[default]
    Idle,
    Capturing,
    Encoding,
    AwaitingInference,
    Settled(Outcome),
}

impl ActionState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::Encoding => "encoding",
            Self::AwaitingInference => "awaiting-inference",
            Self::Settled(Outcome::Success) => "settled",
            Self::Settled(Outcome::Failed(_)) => "failed",
        }
    }

    /// Whether a new user action may start from here
    pub const fn accepts_new_action(&self) -> bool {
        matches!(self, Self::Idle | Self::Settled(_))
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while {current_state}")]
pub struct InvalidStateTransition {
    pub current_state: ActionState,
    pub action: String,
}

/// State of one action slot.
///
/// ```text
/// Idle | Settled -> Capturing          (start_capture)
/// Capturing      -> Encoding           (finish_capture)
/// Capturing      -> Idle               (cancel_capture)
/// Encoding       -> AwaitingInference  (begin_inference)
/// Idle | Settled -> AwaitingInference  (submit)
/// busy           -> Settled            (settle)
/// ```
#[derive(Debug, Default)]
pub struct ActionSession {
    state: ActionState,
}

impl ActionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    pub fn is_awaiting_inference(&self) -> bool {
        self.state == ActionState::AwaitingInference
    }

    pub fn start_capture(&mut self) -> Result<(), InvalidStateTransition> {
        self.require(self.state.accepts_new_action(), "start capture")?;
        self.state = ActionState::Capturing;
        Ok(())
    }

    pub fn finish_capture(&mut self) -> Result<(), InvalidStateTransition> {
        self.require(self.state == ActionState::Capturing, "stop capture")?;
        self.state = ActionState::Encoding;
        Ok(())
    }

    pub fn cancel_capture(&mut self) -> Result<(), InvalidStateTransition> {
        self.require(self.state == ActionState::Capturing, "cancel capture")?;
        self.state = ActionState::Idle;
        Ok(())
    }

    pub fn begin_inference(&mut self) -> Result<(), InvalidStateTransition> {
        self.require(self.state == ActionState::Encoding, "begin inference")?;
        self.state = ActionState::AwaitingInference;
        Ok(())
    }

    /// Typed input skips capture and encoding
    pub fn submit(&mut self) -> Result<(), InvalidStateTransition> {
        self.require(self.state.accepts_new_action(), "submit")?;
        self.state = ActionState::AwaitingInference;
        Ok(())
    }

    pub fn settle(&mut self, outcome: Outcome) -> Result<(), InvalidStateTransition> {
        self.require(!self.state.accepts_new_action(), "settle")?;
        self.state = ActionState::Settled(outcome);
        Ok(())
    }

    fn require(&self, allowed: bool, action: &str) -> Result<(), InvalidStateTransition> {
        if allowed {
            Ok(())
        } else {
            Err(InvalidStateTransition {
                current_state: self.state,
                action: action.to_string(),
            })
        }
    }
}
