//! Capture infrastructure module
//!
//! Microphone capture through cpal (packed as 16kHz mono FLAC) and a
//! file-backed still image source standing in for the camera.

mod flac;
mod microphone;
mod still_image;

pub use flac::{pcm_to_flac, TARGET_SAMPLE_RATE};
pub use microphone::MicrophoneCapture;
pub use still_image::StillImageCapture;

use async_trait::async_trait;

use crate::application::ports::{CaptureError, CaptureHandle, MediaCapture};
use crate::domain::capture::{CaptureKind, CapturedMedia};

/// Routes audio captures to the microphone and video to the camera
pub struct DeviceCapture {
    microphone: MicrophoneCapture,
    camera: StillImageCapture,
}

impl DeviceCapture {
    pub fn new(microphone: MicrophoneCapture, camera: StillImageCapture) -> Self {
        Self { microphone, camera }
    }

    /// Microphone only
    pub fn microphone() -> Self {
        Self::new(MicrophoneCapture::new(), StillImageCapture::unavailable())
    }

    /// Camera reading frames from `image`
    pub fn camera(image: impl Into<std::path::PathBuf>) -> Self {
        Self::new(MicrophoneCapture::new(), StillImageCapture::new(image))
    }

    fn device(&self, kind: CaptureKind) -> &dyn MediaCapture {
        match kind {
            CaptureKind::Audio => &self.microphone,
            CaptureKind::Video => &self.camera,
        }
    }
}

#[async_trait]
impl MediaCapture for DeviceCapture {
    async fn start(&self, kind: CaptureKind) -> Result<CaptureHandle, CaptureError> {
        self.device(kind).start(kind).await
    }

    async fn stop(&self, handle: CaptureHandle) -> Result<CapturedMedia, CaptureError> {
        self.device(handle.kind()).stop(handle).await
    }

    async fn cancel(&self, handle: CaptureHandle) -> Result<(), CaptureError> {
        self.device(handle.kind()).cancel(handle).await
    }

    fn is_active(&self) -> bool {
        self.microphone.is_active() || self.camera.is_active()
    }
}
