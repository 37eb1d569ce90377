//! Unified error type for thumbnailer.

use thiserror::Error;

/// Errors that can occur while producing a thumbnail.
///
/// The stage variants (`Fetch`, `Transcode`, `InvalidKey`, `Upload`) keep the
/// root cause for logging. Callers of
/// [`ThumbnailGenerator::generate`](crate::generator::ThumbnailGenerator::generate)
/// only ever see [`ThumbnailError::GenerationFailed`].
#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// The source image could not be downloaded.
    #[error("Failed to fetch {url}: {message}")]
    Fetch {
        /// The source image URL.
        url: String,
        /// HTTP status or transport error.
        message: String,
    },

    /// The downloaded bytes could not be decoded, resized or re-encoded.
    #[error("Transcode error: {0}")]
    Transcode(String),

    /// No usable storage key could be derived from the source URL.
    #[error("Cannot derive a storage key from {0}: URL has no final path segment")]
    InvalidKey(String),

    /// The thumbnail could not be written to object storage.
    #[error("Failed to upload {key}: {message}")]
    Upload {
        /// The destination object key.
        key: String,
        /// Storage client error.
        message: String,
    },

    /// The single failure reported across the generate boundary.
    #[error("Thumbnail generation failed")]
    GenerationFailed,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// A required setting is neither in the config file nor the environment.
    #[error("Missing setting {setting}. Set {env_var} or add it to config file.")]
    MissingSetting {
        /// Dotted config file path of the setting.
        setting: String,
        /// The environment variable name.
        env_var: String,
    },
}

impl ThumbnailError {
    /// Pipeline stage the error belongs to, used as a log field.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::Transcode(_) => "transcode",
            Self::InvalidKey(_) => "key",
            Self::Upload { .. } => "upload",
            Self::GenerationFailed => "generate",
            Self::Io(_) | Self::Config(_) | Self::MissingSetting { .. } => "setup",
        }
    }
}
