//! Error types for the converter module.

use thiserror::Error;

use crate::classifier::MediaFamily;

/// Errors that can occur while converting an upload.
///
/// The `Display` text of each variant is what the caller ultimately sees, so
/// engine failures carry the engine's own message untouched.
#[derive(Debug, Error)]
pub enum ConverterError {
    /// The upload's extension matches no known family.
    #[error("Неподдерживаемый формат")]
    UnsupportedSourceFormat { file_name: String },

    /// The source family is known but its adapter cannot produce the requested format.
    #[error("{}", unsupported_target_message(.family))]
    UnsupportedTargetFormat { family: MediaFamily, format: String },

    /// The requested format token is empty or contains characters that are
    /// not allowed in a file suffix.
    #[error("Invalid target format: {format:?}")]
    InvalidTargetFormat { format: String },

    /// The external engine reported an error.
    #[error("{message}")]
    EngineFailure {
        engine: &'static str,
        message: String,
    },

    /// The adapter did not settle in time.
    #[error("Conversion timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Any other fault raised while converting (including adapter panics).
    #[error("{0}")]
    Unexpected(String),

    /// I/O error while reading the upload or writing scratch files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn unsupported_target_message(family: &MediaFamily) -> &'static str {
    match family {
        MediaFamily::Image => "Неподдерживаемый формат изображения",
        MediaFamily::Document => "Неподдерживаемый формат документа",
        MediaFamily::Video | MediaFamily::Audio => "Неподдерживаемый медиаформат",
        MediaFamily::Unsupported => "Неподдерживаемый формат",
    }
}

impl ConverterError {
    /// Creates a new engine failure error.
    pub fn engine_failure(engine: &'static str, message: impl Into<String>) -> Self {
        Self::EngineFailure {
            engine,
            message: message.into(),
        }
    }

    /// Creates a new unexpected fault.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedSourceFormat { .. } => "unsupported_source",
            Self::UnsupportedTargetFormat { .. } => "unsupported_target",
            Self::InvalidTargetFormat { .. } => "invalid_target",
            Self::EngineFailure { .. } => "engine_failure",
            Self::Timeout { .. } => "timeout",
            Self::Unexpected(_) | Self::Io(_) => "unexpected",
        }
    }
}
