//! Capture domain module

mod limit;
mod media;

pub use limit::{CaptureLimit, DEFAULT_CAPTURE_LIMIT_SECS, MAX_CAPTURE_LIMIT_SECS};
pub use media::{CaptureKind, CapturedMedia, EncodedMedia, MediaMimeType};
