//! File-backed camera source
//!
//! Stands in for a camera: the "frame" is an image on disk (a label photo
//! or a snapshot from a storage camera) read when the capture stops.

use std::path::{Path, PathBuf};
use std::sync::{Mutex as StdMutex, PoisonError};

use async_trait::async_trait;

use crate::application::ports::{CaptureError, CaptureHandle, MediaCapture};
use crate::domain::capture::{CaptureKind, CapturedMedia, MediaMimeType};

pub struct StillImageCapture {
    source: Option<PathBuf>,
    open: StdMutex<Option<CaptureHandle>>,
}

impl StillImageCapture {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(source.into()),
            open: StdMutex::new(None),
        }
    }

    /// A camera with nothing attached; every start is refused
    pub fn unavailable() -> Self {
        Self {
            source: None,
            open: StdMutex::new(None),
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn release(&self, handle: CaptureHandle) -> Result<(), CaptureError> {
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        if *open != Some(handle) {
            return Err(CaptureError::UnknownHandle);
        }
        *open = None;
        Ok(())
    }
}

#[async_trait]
impl MediaCapture for StillImageCapture {
    async fn start(&self, kind: CaptureKind) -> Result<CaptureHandle, CaptureError> {
        if kind != CaptureKind::Video {
            return Err(CaptureError::PermissionDenied("the camera records images only".into()));
        }
        let source = self
            .source
            .as_deref()
            .ok_or_else(|| CaptureError::PermissionDenied("no camera source available".into()))?;
        if !tokio::fs::try_exists(source).await.unwrap_or(false) {
            return Err(CaptureError::PermissionDenied(format!(
                "cannot open {}",
                source.display()
            )));
        }

        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        if open.is_some() {
            return Err(CaptureError::DeviceBusy);
        }
        let handle = CaptureHandle::new(kind);
        *open = Some(handle);
        Ok(handle)
    }

    async fn stop(&self, handle: CaptureHandle) -> Result<CapturedMedia, CaptureError> {
        self.release(handle)?;
        let source = self.source.as_deref().ok_or(CaptureError::UnknownHandle)?;

        let mime_type =
            MediaMimeType::from_path(source).map_err(|e| CaptureError::Failed(e.to_string()))?;
        let data = tokio::fs::read(source)
            .await
            .map_err(|e| CaptureError::Failed(format!("{}: {}", source.display(), e)))?;

        Ok(CapturedMedia::new(data, mime_type))
    }

    async fn cancel(&self, handle: CaptureHandle) -> Result<(), CaptureError> {
        self.release(handle)
    }

    fn is_active(&self) -> bool {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
