//! Domain error types

use thiserror::Error;

/// Error when parsing a capture limit string
#[derive(Debug, Clone, Error)]
#[error(
    "Invalid capture limit: \"{input}\". Expected <number>s, <number>m or <number>m<number>s \
     between 1s and 60m (e.g., 30s, 1m, 2m30s)"
)]
pub struct CaptureLimitParseError {
    pub input: String,
}

/// Error when an unsupported response language is requested
#[derive(Debug, Clone, Error)]
#[error("Invalid language: \"{input}\". Valid languages are: zh, en")]
pub struct InvalidLanguageError {
    pub input: String,
}

/// Error when a file extension does not map to a supported media type
#[derive(Debug, Clone, Error)]
#[error(
    "Unsupported media type for \"{input}\". \
     Supported: flac, ogg, wav, webm, mp3, jpg, jpeg, png, webp"
)]
pub struct UnsupportedMediaError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

/// Error when an inference request does not fit its prompt template
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRequestError {
    #[error("'{template}' needs {expected} input")]
    WrongInput {
        template: &'static str,
        expected: &'static str,
    },

    #[error("'{template}' needs non-empty text")]
    BlankText { template: &'static str },
}
