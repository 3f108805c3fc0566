//! Error types for the launcher core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    /// The launcher's own icon could not be resolved, so the settings entry
    /// cannot be built
    #[error("icon for launcher package {0} could not be resolved")]
    MissingOwnIcon(String),

    #[error("{0} is not supported on this platform")]
    Unsupported(String),

    #[error("failed to decode icon {path}: {source}")]
    Icon {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("{field} must be a positive number of pixels, got {value}")]
    InvalidScreenSize { field: &'static str, value: f64 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LauncherError>;
