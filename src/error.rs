//! Error types for the localizer

use thiserror::Error;

/// Localization error type
#[derive(Error, Debug)]
pub enum LocalizationError {
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid field: corner ({min_x}, {min_y}) is not below ({max_x}, {max_y})")]
    InvalidField {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },

    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    #[error("Localization worker panicked")]
    WorkerPanicked,
}

impl LocalizationError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        LocalizationError::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<toml::de::Error> for LocalizationError {
    fn from(e: toml::de::Error) -> Self {
        LocalizationError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LocalizationError>;
