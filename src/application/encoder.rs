//! Payload encoder: captured bytes to a transport-safe string

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

use crate::domain::capture::{CapturedMedia, EncodedMedia};

#[derive(Debug, Clone, Error)]
pub enum EncodingError {
    #[error("Captured media is empty")]
    EmptyBuffer,

    #[error("Encoding was interrupted: {0}")]
    Interrupted(String),
}

/// Base64-encodes captured media off the async executor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadEncoder;

impl PayloadEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Consume the media and return its encoded form.
    ///
    /// The work runs on the blocking pool; the caller is suspended until
    /// it completes.
    pub async fn encode(&self, media: CapturedMedia) -> Result<EncodedMedia, EncodingError> {
        if media.is_empty() {
            return Err(EncodingError::EmptyBuffer);
        }

        let (data, mime_type) = media.into_parts();
        let encoded = tokio::task::spawn_blocking(move || STANDARD.encode(data))
            .await
            .map_err(|e| EncodingError::Interrupted(e.to_string()))?;

        Ok(EncodedMedia::new(encoded, mime_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capture::MediaMimeType;

    #[tokio::test]
    async fn encodes_to_base64() {
        let media = CapturedMedia::new(b"fLaC".to_vec(), MediaMimeType::Flac);
        let encoded = PayloadEncoder::new().encode(media).await.unwrap();
        assert_eq!(encoded.data(), "ZkxhQw==");
        assert_eq!(encoded.mime_type(), MediaMimeType::Flac);
    }

    #[tokio::test]
    async fn empty_buffer_is_rejected() {
        let media = CapturedMedia::new(Vec::new(), MediaMimeType::Jpeg);
        let err = PayloadEncoder::new().encode(media).await.unwrap_err();
        assert!(matches!(err, EncodingError::EmptyBuffer));
    }

    #[tokio::test]
    async fn encoding_is_deterministic() {
        let bytes = vec![0u8, 255, 17, 42, 99];
        let a = PayloadEncoder::new()
            .encode(CapturedMedia::new(bytes.clone(), MediaMimeType::Png))
            .await
            .unwrap();
        let b = PayloadEncoder::new()
            .encode(CapturedMedia::new(bytes, MediaMimeType::Png))
            .await
            .unwrap();
        assert_eq!(a, b);
    }
}
