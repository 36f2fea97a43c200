//! Error types for the recognition pipeline.
//!
//! None of these are fatal to a session: each one is stored as session state
//! and the operator retries by changing the inputs.

use std::sync::Arc;

use thiserror::Error;

/// A required selection is missing. Blocks submission; nothing is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please choose a fingerprint image")]
    MissingFile,

    #[error("Please choose an area")]
    MissingArea,

    #[error("Please choose a segmentation model")]
    MissingSegmentationModel,

    #[error("Please choose a recognition model")]
    MissingRecognitionModel,
}

/// The preview could not be produced. Clears the preview only; the raw bytes
/// are still submitted.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("No preview available for .{0} files")]
    UnsupportedExtension(String),

    #[error("File has no extension")]
    MissingExtension,

    #[error("Failed to decode image: {0}")]
    Corrupt(#[from] image::ImageError),

    #[error("Failed to export preview: {0}")]
    Export(String),
}

/// Network failure, non-2xx response or undecodable body.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Failed to build request: {0}")]
    Build(String),
}

impl TransportError {
    /// Status code of a rejected response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Why a full submission attempt produced no result.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(Arc<TransportError>),

    #[error("Submission was superseded by a newer one")]
    Superseded,
}

impl From<TransportError> for SubmitError {
    fn from(e: TransportError) -> Self {
        Self::Transport(Arc::new(e))
    }
}
