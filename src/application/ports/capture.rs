//! Media capture port interface

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::capture::{CaptureKind, CapturedMedia};

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// Device missing, unavailable or access refused
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Capture device is already in use")]
    DeviceBusy,

    #[error("Capture failed: {0}")]
    Failed(String),

    #[error("No capture in progress for this handle")]
    UnknownHandle,
}

/// Token for one open capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureHandle {
    id: Uuid,
    kind: CaptureKind,
}

impl CaptureHandle {
    pub fn new(kind: CaptureKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }
}

/// Port for permission-gated microphone and camera capture.
///
/// Adapters hold at most one open capture and must release the device on
/// every exit path: `stop`, `cancel`, or an error from either.
#[async_trait]
pub trait MediaCapture: Send + Sync {
    /// Acquire the device and begin buffering.
    async fn start(&self, kind: CaptureKind) -> Result<CaptureHandle, CaptureError>;

    /// Release the device and return what was buffered.
    ///
    /// A capture that recorded nothing yields empty media rather than an
    /// error; rejecting it is the encoder's job.
    async fn stop(&self, handle: CaptureHandle) -> Result<CapturedMedia, CaptureError>;

    /// Release the device and drop the buffer.
    async fn cancel(&self, handle: CaptureHandle) -> Result<(), CaptureError>;

    /// Whether a device stream is currently held
    fn is_active(&self) -> bool;
}
