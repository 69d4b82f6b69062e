#![forbid(unsafe_code)]

//! Errors of the fallible surface (configuration loading).
//!
//! Interactive operations never fail: bad geometry and missing nodes degrade
//! to "does not collide" instead of producing errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "config")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[cfg(feature = "config")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
