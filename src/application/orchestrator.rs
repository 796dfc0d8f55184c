//! Task orchestrator
//!
//! Drives one user action per slot through capture, encoding, inference and
//! normalization. Every failure is caught here and turned into a settled
//! slot; callers only see `ActionRejected` when the action never started.

use std::collections::HashMap;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::action::{
    ActionSession, ActionSlot, ActionState, FailureKind, InvalidStateTransition, Outcome,
};
use crate::domain::capture::CaptureKind;
use crate::domain::error::InvalidRequestError;
use crate::domain::inference::{
    InferenceRequest, Language, LocalContext, PromptTemplate, TemplateInput,
};
use crate::domain::records::{normalize, DomainRecord, NormalizeError};
use crate::domain::workspace::Workspace;

use super::encoder::{EncodingError, PayloadEncoder};
use super::gateway::{InferenceError, InferenceGateway};
use super::ports::{CaptureError, CaptureHandle, InferenceProvider, MediaCapture};

/// Why a started action ended without a record
#[derive(Debug, Clone, Error)]
pub enum ActionFailure {
    #[error("{0}")]
    PermissionDenied(CaptureError),

    #[error("{0}")]
    Capture(CaptureError),

    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Inference failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("No result: {0}")]
    IncompleteRecord(#[from] NormalizeError),
}

impl From<CaptureError> for ActionFailure {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::PermissionDenied(_) => Self::PermissionDenied(err),
            other => Self::Capture(other),
        }
    }
}

impl ActionFailure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::PermissionDenied(_) => FailureKind::PermissionDenied,
            Self::Capture(_) => FailureKind::Capture,
            Self::Encoding(_) => FailureKind::Encoding,
            Self::Inference(InferenceError::Transport(_)) => FailureKind::InferenceTransport,
            Self::Inference(InferenceError::Parse(_)) => FailureKind::InferenceParse,
            Self::Inference(InferenceError::Empty) => FailureKind::InferenceEmpty,
            Self::IncompleteRecord(_) => FailureKind::IncompleteRecord,
        }
    }
}

/// A user action that was refused outright; slot state is unchanged
#[derive(Debug, Clone, Error)]
pub enum ActionRejected {
    #[error("The {slot} action is busy ({state})")]
    Busy { slot: ActionSlot, state: ActionState },

    #[error("The capture device is in use by the {owner} action")]
    DeviceBusy { owner: ActionSlot },

    #[error("The {slot} action has no capture in progress")]
    NotCapturing { slot: ActionSlot },

    #[error("'{template}' does not take captured media")]
    NotCapturable { template: PromptTemplate },

    #[error(transparent)]
    InvalidRequest(#[from] InvalidRequestError),
}

/// Terminal result of one action
#[derive(Debug)]
pub struct Settlement {
    pub slot: ActionSlot,
    pub template: PromptTemplate,
    pub result: Result<DomainRecord, ActionFailure>,
}

impl Settlement {
    pub fn outcome(&self) -> Outcome {
        match &self.result {
            Ok(_) => Outcome::Success,
            Err(failure) => Outcome::Failed(failure.kind()),
        }
    }

    /// Store the record in the workspace. A failure leaves it untouched.
    pub fn apply(self, workspace: &mut Workspace) -> Result<(), ActionFailure> {
        let record = self.result?;
        workspace.apply(self.template, record);
        Ok(())
    }
}

#[derive(Debug)]
pub enum Submission {
    Settled(Settlement),
    /// The slot was already awaiting inference; nothing was sent
    Ignored,
}

#[derive(Debug)]
pub enum CaptureStart {
    Capturing,
    /// The device could not be acquired; the slot has settled
    Failed(Settlement),
}

struct PendingCapture {
    handle: CaptureHandle,
    template: PromptTemplate,
    language: Language,
}

#[derive(Default)]
struct SlotEntry {
    session: ActionSession,
    capture: Option<PendingCapture>,
}

pub struct TaskOrchestrator<C, P>
where
    C: MediaCapture,
    P: InferenceProvider,
{
    capture: C,
    encoder: PayloadEncoder,
    gateway: InferenceGateway<P>,
    slots: Mutex<HashMap<ActionSlot, SlotEntry>>,
    /// Slot holding the capture device; lock after `slots`
    device_owner: Mutex<Option<ActionSlot>>,
}

impl<C, P> TaskOrchestrator<C, P>
where
    C: MediaCapture,
    P: InferenceProvider,
{
    pub fn new(capture: C, provider: P) -> Self {
        Self {
            capture,
            encoder: PayloadEncoder::new(),
            gateway: InferenceGateway::new(provider),
            slots: Mutex::new(HashMap::new()),
            device_owner: Mutex::new(None),
        }
    }

    pub async fn state(&self, slot: ActionSlot) -> ActionState {
        self.slots
            .lock()
            .await
            .get(&slot)
            .map(|entry| entry.session.state())
            .unwrap_or_default()
    }

    /// Slot currently holding the capture device
    pub async fn device_owner(&self) -> Option<ActionSlot> {
        *self.device_owner.lock().await
    }

    /// Open the microphone or camera for a media template.
    pub async fn start_capture(
        &self,
        template: PromptTemplate,
        language: Language,
    ) -> Result<CaptureStart, ActionRejected> {
        let kind = match template.input() {
            TemplateInput::Audio => CaptureKind::Audio,
            TemplateInput::Image => CaptureKind::Video,
            TemplateInput::Text | TemplateInput::Context => {
                return Err(ActionRejected::NotCapturable { template })
            }
        };
        let slot = ActionSlot::for_template(template);

        {
            let mut slots = self.slots.lock().await;
            let entry = slots.entry(slot).or_default();
            let state = entry.session.state();
            if !state.accepts_new_action() {
                return Err(ActionRejected::Busy { slot, state });
            }

            let mut owner = self.device_owner.lock().await;
            if let Some(holder) = *owner {
                return Err(ActionRejected::DeviceBusy { owner: holder });
            }
            entry
                .session
                .start_capture()
                .map_err(|e| busy(slot, e))?;
            *owner = Some(slot);
        }

        match self.capture.start(kind).await {
            Ok(handle) => {
                let mut slots = self.slots.lock().await;
                let entry = slots.entry(slot).or_default();
                if entry.session.state() == ActionState::Capturing {
                    entry.capture = Some(PendingCapture {
                        handle,
                        template,
                        language,
                    });
                    tracing::info!(slot = %slot, ?kind, handle = %handle.id(), "capture started");
                    Ok(CaptureStart::Capturing)
                } else {
                    // Cancelled while the device was still opening.
                    drop(slots);
                    if let Err(e) = self.capture.cancel(handle).await {
                        tracing::warn!(slot = %slot, error = %e, "failed to release late capture");
                    }
                    Err(ActionRejected::NotCapturing { slot })
                }
            }
            Err(err) => {
                self.release_device(slot).await;
                tracing::warn!(slot = %slot, error = %err, "capture could not start");
                let settlement = self.settle(slot, template, Err(err.into())).await;
                Ok(CaptureStart::Failed(settlement))
            }
        }
    }

    /// Stop the slot's capture and run it through encoding and inference.
    pub async fn stop_capture(&self, slot: ActionSlot) -> Result<Settlement, ActionRejected> {
        let pending = {
            let mut slots = self.slots.lock().await;
            let entry = slots
                .get_mut(&slot)
                .ok_or(ActionRejected::NotCapturing { slot })?;
            if entry.session.state() != ActionState::Capturing {
                return Err(ActionRejected::NotCapturing { slot });
            }
            let pending = entry
                .capture
                .take()
                .ok_or(ActionRejected::NotCapturing { slot })?;
            entry
                .session
                .finish_capture()
                .map_err(|_| ActionRejected::NotCapturing { slot })?;
            pending
        };
        let template = pending.template;

        let handle = pending.handle;
        let stopped = self.capture.stop(handle).await;
        self.release_device(slot).await;

        let media = match stopped {
            Ok(media) => media,
            Err(err) => return Ok(self.settle(slot, template, Err(err.into())).await),
        };
        tracing::info!(
            slot = %slot,
            handle = %handle.id(),
            size = %media.human_readable_size(),
            "capture stopped"
        );

        let encoded = match self.encoder.encode(media).await {
            Ok(encoded) => encoded,
            Err(err) => return Ok(self.settle(slot, template, Err(err.into())).await),
        };

        let request = match InferenceRequest::from_media(template, encoded, pending.language) {
            Ok(request) => request,
            Err(err) => {
                let failure = ActionFailure::Capture(CaptureError::Failed(err.to_string()));
                return Ok(self.settle(slot, template, Err(failure)).await);
            }
        };

        self.transition(slot, ActionSession::begin_inference).await;
        let result = self.infer(&request).await;
        Ok(self.settle(slot, template, result).await)
    }

    /// Abort the slot's capture. The device is released and no media is
    /// produced.
    pub async fn cancel_capture(&self, slot: ActionSlot) -> Result<(), ActionRejected> {
        let pending = {
            let mut slots = self.slots.lock().await;
            let entry = slots
                .get_mut(&slot)
                .ok_or(ActionRejected::NotCapturing { slot })?;
            entry
                .session
                .cancel_capture()
                .map_err(|_| ActionRejected::NotCapturing { slot })?;
            entry.capture.take()
        };

        if let Some(pending) = pending {
            if let Err(e) = self.capture.cancel(pending.handle).await {
                tracing::warn!(slot = %slot, error = %e, "capture cancel reported an error");
            }
        }
        self.release_device(slot).await;
        tracing::info!(slot = %slot, "capture cancelled");
        Ok(())
    }

    /// Send typed text straight to inference.
    ///
    /// A second submit while the slot is awaiting inference is ignored.
    pub async fn submit_text(
        &self,
        template: PromptTemplate,
        text: &str,
        language: Language,
        context: LocalContext,
    ) -> Result<Submission, ActionRejected> {
        let request = InferenceRequest::from_text(template, text, language, context)?;
        self.submit(request).await
    }

    /// Run a template that is built from local context alone.
    pub async fn submit_context(
        &self,
        template: PromptTemplate,
        language: Language,
        context: LocalContext,
    ) -> Result<Submission, ActionRejected> {
        let request = InferenceRequest::from_context(template, context, language)?;
        self.submit(request).await
    }

    async fn submit(&self, request: InferenceRequest) -> Result<Submission, ActionRejected> {
        let template = request.template();
        let slot = ActionSlot::for_template(template);

        {
            let mut slots = self.slots.lock().await;
            let entry = slots.entry(slot).or_default();
            if entry.session.is_awaiting_inference() {
                tracing::debug!(slot = %slot, "duplicate submission ignored");
                return Ok(Submission::Ignored);
            }
            entry.session.submit().map_err(|e| busy(slot, e))?;
        }
        tracing::info!(slot = %slot, template = %template, "awaiting inference");

        let result = self.infer(&request).await;
        Ok(Submission::Settled(self.settle(slot, template, result).await))
    }

    async fn infer(&self, request: &InferenceRequest) -> Result<DomainRecord, ActionFailure> {
        let result = self.gateway.invoke(request).await?;
        Ok(normalize(&result, request.kind())?)
    }

    async fn settle(
        &self,
        slot: ActionSlot,
        template: PromptTemplate,
        result: Result<DomainRecord, ActionFailure>,
    ) -> Settlement {
        let settlement = Settlement {
            slot,
            template,
            result,
        };
        let outcome = settlement.outcome();
        self.transition(slot, |session| session.settle(outcome)).await;

        match &settlement.result {
            Ok(record) => tracing::info!(slot = %slot, record = record.label(), "action settled"),
            Err(failure) => {
                tracing::warn!(
                    slot = %slot,
                    kind = failure.kind().as_str(),
                    error = %failure,
                    "action failed"
                )
            }
        }
        settlement
    }

    async fn transition(
        &self,
        slot: ActionSlot,
        step: impl FnOnce(&mut ActionSession) -> Result<(), InvalidStateTransition>,
    ) {
        let mut slots = self.slots.lock().await;
        let entry = slots.entry(slot).or_default();
        if let Err(e) = step(&mut entry.session) {
            tracing::warn!(slot = %slot, error = %e, "unexpected state transition");
        }
    }

    async fn release_device(&self, slot: ActionSlot) {
        let mut owner = self.device_owner.lock().await;
        if *owner == Some(slot) {
            *owner = None;
        }
    }
}

fn busy(slot: ActionSlot, err: InvalidStateTransition) -> ActionRejected {
    ActionRejected::Busy {
        slot,
        state: err.current_state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{ProviderCall, ProviderError};
    use crate::domain::capture::{CapturedMedia, MediaMimeType};
    use crate::domain::records::Transcript;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct MockCapture {
        active: Arc<AtomicBool>,
        deny: bool,
        stops: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl MediaCapture for MockCapture {
        async fn start(&self, kind: CaptureKind) -> Result<CaptureHandle, CaptureError> {
            if self.deny {
                return Err(CaptureError::PermissionDenied("microphone blocked".into()));
            }
            if self.active.swap(true, Ordering::SeqCst) {
                return Err(CaptureError::DeviceBusy);
            }
            Ok(CaptureHandle::new(kind))
        }

        async fn stop(&self, _handle: CaptureHandle) -> Result<CapturedMedia, CaptureError> {
            self.stops.fetch_add(1, Ordering::SeqCst);
            self.active.store(false, Ordering::SeqCst);
            Ok(CapturedMedia::new(vec![1, 2, 3, 4], MediaMimeType::Flac))
        }

        async fn cancel(&self, _handle: CaptureHandle) -> Result<(), CaptureError> {
            self.active.store(false, Ordering::SeqCst);
            Ok(())
        }

        fn is_active(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }
    }

    struct EchoProvider(&'static str);

    #[async_trait]
    impl InferenceProvider for EchoProvider {
        async fn generate(&self, _call: &ProviderCall) -> Result<Option<String>, ProviderError> {
            Ok(Some(self.0.to_string()))
        }
    }

    #[tokio::test]
    async fn dictation_settles_with_transcript() {
        let capture = MockCapture::default();
        let active = Arc::clone(&capture.active);
        let orchestrator = TaskOrchestrator::new(capture, EchoProvider("Valve 4 sticks"));

        let started = orchestrator
            .start_capture(PromptTemplate::FaultTranscription, Language::En)
            .await
            .unwrap();
        assert!(matches!(started, CaptureStart::Capturing));
        assert_eq!(
            orchestrator.state(ActionSlot::TicketDictation).await,
            ActionState::Capturing
        );

        let settlement = orchestrator
            .stop_capture(ActionSlot::TicketDictation)
            .await
            .unwrap();

        assert_eq!(
            settlement.result.unwrap(),
            DomainRecord::Transcript(Transcript {
                text: "Valve 4 sticks".into()
            })
        );
        assert_eq!(
            orchestrator.state(ActionSlot::TicketDictation).await,
            ActionState::Settled(Outcome::Success)
        );
        assert!(!active.load(Ordering::SeqCst));
        assert_eq!(orchestrator.device_owner().await, None);
    }

    #[tokio::test]
    async fn cancel_releases_device_without_media() {
        let capture = MockCapture::default();
        let active = Arc::clone(&capture.active);
        let stops = Arc::clone(&capture.stops);
        let orchestrator = TaskOrchestrator::new(capture, EchoProvider("unused"));

        orchestrator
            .start_capture(PromptTemplate::InventoryVoiceEntry, Language::Zh)
            .await
            .unwrap();
        assert!(active.load(Ordering::SeqCst));

        orchestrator
            .cancel_capture(ActionSlot::InventoryVoice)
            .await
            .unwrap();

        assert!(!active.load(Ordering::SeqCst));
        assert_eq!(stops.load(Ordering::SeqCst), 0);
        assert_eq!(orchestrator.device_owner().await, None);
        assert_eq!(
            orchestrator.state(ActionSlot::InventoryVoice).await,
            ActionState::Idle
        );
        assert!(matches!(
            orchestrator.stop_capture(ActionSlot::InventoryVoice).await,
            Err(ActionRejected::NotCapturing { .. })
        ));
    }

    #[tokio::test]
    async fn permission_denied_settles_the_slot() {
        let capture = MockCapture {
            deny: true,
            ..Default::default()
        };
        let orchestrator = TaskOrchestrator::new(capture, EchoProvider("unused"));

        let started = orchestrator
            .start_capture(PromptTemplate::FaultTranscription, Language::En)
            .await
            .unwrap();

        let CaptureStart::Failed(settlement) = started else {
            panic!("expected failed start");
        };
        assert_eq!(
            settlement.outcome(),
            Outcome::Failed(FailureKind::PermissionDenied)
        );
        assert_eq!(orchestrator.device_owner().await, None);
    }

    #[tokio::test]
    async fn second_capture_on_another_slot_is_rejected() {
        let orchestrator = TaskOrchestrator::new(MockCapture::default(), EchoProvider("unused"));

        orchestrator
            .start_capture(PromptTemplate::FaultTranscription, Language::En)
            .await
            .unwrap();
        let err = orchestrator
            .start_capture(PromptTemplate::StorageInspection, Language::En)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ActionRejected::DeviceBusy {
                owner: ActionSlot::TicketDictation
            }
        ));
        assert_eq!(
            orchestrator.state(ActionSlot::StorageInspection).await,
            ActionState::Idle
        );
    }

    #[tokio::test]
    async fn capturing_slot_rejects_restart_while_others_run() {
        let orchestrator = TaskOrchestrator::new(MockCapture::default(), EchoProvider("unused"));
        orchestrator
            .start_capture(PromptTemplate::FaultTranscription, Language::En)
            .await
            .unwrap();

        let report = orchestrator
            .submit_context(
                PromptTemplate::InventoryReport,
                Language::En,
                LocalContext::Inventory(vec![]),
            )
            .await
            .unwrap();
        assert!(matches!(report, Submission::Settled(_)));

        let err = orchestrator
            .start_capture(PromptTemplate::FaultTranscription, Language::En)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionRejected::Busy { .. }));
    }

    #[tokio::test]
    async fn text_template_cannot_capture() {
        let orchestrator = TaskOrchestrator::new(MockCapture::default(), EchoProvider("unused"));
        let err = orchestrator
            .start_capture(PromptTemplate::TicketExtraction, Language::En)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionRejected::NotCapturable { .. }));
    }

    #[tokio::test]
    async fn settled_slot_restarts_on_new_action() {
        let orchestrator =
            TaskOrchestrator::new(MockCapture::default(), EchoProvider("not json at all"));

        let first = orchestrator
            .submit_text(
                PromptTemplate::TicketExtraction,
                "Pump 2 overheats",
                Language::En,
                LocalContext::None,
            )
            .await
            .unwrap();
        let Submission::Settled(first) = first else {
            panic!("expected settlement");
        };
        assert_eq!(first.outcome(), Outcome::Failed(FailureKind::InferenceParse));

        let second = orchestrator
            .submit_text(
                PromptTemplate::TicketExtraction,
                "Pump 2 overheats",
                Language::En,
                LocalContext::None,
            )
            .await
            .unwrap();
        assert!(matches!(second, Submission::Settled(_)));
    }

    #[tokio::test]
    async fn blank_text_is_rejected_before_any_state_change() {
        let orchestrator = TaskOrchestrator::new(MockCapture::default(), EchoProvider("unused"));
        let err = orchestrator
            .submit_text(
                PromptTemplate::ProcessRecommendation,
                "   ",
                Language::En,
                LocalContext::None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ActionRejected::InvalidRequest(_)));
        assert_eq!(
            orchestrator.state(ActionSlot::Recommendation).await,
            ActionState::Idle
        );
    }
}
