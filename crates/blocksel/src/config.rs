#![forbid(unsafe_code)]

//! Tunable parameters of the selection engine.
//!
//! Every field has a default matching the editor's built-in behaviour, so
//! `SelectionConfig::default()` needs no file at all.
//!
//! # Loading
//!
//! With the `config` feature enabled:
//!
//! ```toml
//! # blocksel.toml
//! drag_threshold = 12.0
//!
//! [auto_scroll]
//! edge_margin = 60.0
//! ```
//!
//! ```rust,ignore
//! let config = SelectionConfig::from_toml_file("blocksel.toml")?;
//! let config = SelectionConfig::from_json_str(json)?;
//! ```

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SelectionConfig {
    /// Width or height (px) the drag rectangle must reach before a press
    /// counts as a drag rather than a click.
    pub drag_threshold: f64,

    /// Fraction of the viewport height the container may scroll before the
    /// node index is rebuilt instead of refreshed.
    pub rebuild_fraction: f64,

    /// Height of the sticky header that covers the top of the scroll
    /// container; revealed nodes are kept below it.
    pub header_height: f64,

    pub auto_scroll: AutoScrollConfig,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 10.0,
            rebuild_fraction: 0.5,
            header_height: 52.0,
            auto_scroll: AutoScrollConfig::default(),
        }
    }
}

/// Edge-proximity scrolling while dragging.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct AutoScrollConfig {
    /// Distance (px) from the viewport edge at which scrolling kicks in.
    pub edge_margin: f64,

    /// Scroll distance per tick with the pointer at (or past) the edge.
    pub max_step: f64,
}

impl Default for AutoScrollConfig {
    fn default() -> Self {
        Self {
            edge_margin: 40.0,
            max_step: 24.0,
        }
    }
}

impl SelectionConfig {
    /// Check every field, returning the first violation.
    pub fn validate(&self) -> Result<()> {
        positive("drag_threshold", self.drag_threshold)?;
        if !(self.rebuild_fraction > 0.0 && self.rebuild_fraction <= 1.0) {
            return Err(ConfigError::invalid(
                "rebuild_fraction",
                format!("{} is outside (0, 1]", self.rebuild_fraction),
            ));
        }
        non_negative("header_height", self.header_height)?;
        positive("auto_scroll.edge_margin", self.auto_scroll.edge_margin)?;
        non_negative("auto_scroll.max_step", self.auto_scroll.max_step)?;
        Ok(())
    }

    /// Parse from a TOML string. Missing fields take their defaults.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse from a JSON string. Missing fields take their defaults.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be positive")))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("{value} must not be negative"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SelectionConfig::default();
        assert_eq!(config.drag_threshold, 10.0);
        assert_eq!(config.rebuild_fraction, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_catches_bad_threshold() {
        let config = SelectionConfig {
            drag_threshold: 0.0,
            ..SelectionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "drag_threshold",
                ..
            })
        ));
    }

    #[test]
    fn validate_catches_bad_rebuild_fraction() {
        for fraction in [0.0, 1.5, f64::NAN] {
            let config = SelectionConfig {
                rebuild_fraction: fraction,
                ..SelectionConfig::default()
            };
            assert!(config.validate().is_err(), "{fraction} accepted");
        }
    }

    #[test]
    fn validate_catches_negative_auto_scroll() {
        let mut config = SelectionConfig::default();
        config.auto_scroll.max_step = -1.0;
        assert!(config.validate().is_err());
    }

    #[cfg(feature = "config")]
    #[test]
    fn toml_partial_uses_defaults() {
        let config = SelectionConfig::from_toml_str(
            "drag_threshold = 12.0\n[auto_scroll]\nedge_margin = 60.0\n",
        )
        .unwrap();
        assert_eq!(config.drag_threshold, 12.0);
        assert_eq!(config.auto_scroll.edge_margin, 60.0);
        assert_eq!(config.auto_scroll.max_step, 24.0);
        assert_eq!(config.rebuild_fraction, 0.5);
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_rejects_invalid_values() {
        let err = SelectionConfig::from_json_str(r#"{"rebuild_fraction": 2.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "rebuild_fraction", .. }));
    }

    #[cfg(feature = "config")]
    #[test]
    fn missing_file_is_io_error() {
        let err = SelectionConfig::from_toml_file("/nonexistent/blocksel.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
