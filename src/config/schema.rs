//! Configuration schema for Joule-Calc.
//!
//! This module defines the configuration structure and validation logic for
//! all user-configurable settings.

use crate::calculators::OpticUnit;
use crate::history::{HISTORY_ITEMS_PER_PAGE, MAX_HISTORY_ITEMS};
use crate::units::UnitSystem;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised when settings are invalid or cannot be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting holds a value outside its allowed range.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The settings file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path of the settings file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid JSON.
    #[error("invalid JSON in config file {path}: {source}")]
    Parse {
        /// Path of the settings file
        path: PathBuf,
        /// The underlying parse error
        #[source]
        source: serde_json::Error,
    },
}

/// Main configuration structure.
///
/// Settings are read from the `"joule-calc"` key of a JSON settings object.
/// Missing settings fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JouleCalcConfig {
    /// Maximum number of calculations kept in history.
    ///
    /// Defaults to 50. Can be lowered but never raised above 50.
    #[serde(default = "default_max_history_items")]
    pub max_history_items: usize,

    /// Number of history records per page in paginated views.
    ///
    /// Defaults to 10. Must be greater than 0.
    #[serde(default = "default_history_items_per_page")]
    pub history_items_per_page: usize,

    /// Unit system used to interpret weight and velocity input.
    ///
    /// Valid values: "metric", "imperial". Defaults to "metric".
    #[serde(default)]
    pub unit_system: UnitSystem,

    /// Turret unit of the optic for sight corrections.
    ///
    /// Valid values: "moa", "mrad". Defaults to "moa".
    #[serde(default)]
    pub optic_unit: OpticUnit,

    /// Angular value of one turret click, in `optic_unit`.
    ///
    /// Defaults to 0.25 (1/4 MOA). Must be positive.
    #[serde(default = "default_click_value")]
    pub click_value: f64,

    /// Location of the history file.
    ///
    /// Defaults to `<config dir>/joule-calc/history.json` when unset.
    #[serde(default)]
    pub history_file: Option<PathBuf>,
}

impl Default for JouleCalcConfig {
    fn default() -> Self {
        Self {
            max_history_items: default_max_history_items(),
            history_items_per_page: default_history_items_per_page(),
            unit_system: UnitSystem::default(),
            optic_unit: OpticUnit::default(),
            click_value: default_click_value(),
            history_file: None,
        }
    }
}

impl JouleCalcConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history_items == 0 || self.max_history_items > MAX_HISTORY_ITEMS {
            return Err(ConfigError::Invalid(format!(
                "maxHistoryItems must be between 1 and {}",
                MAX_HISTORY_ITEMS
            )));
        }

        if self.history_items_per_page == 0 {
            return Err(ConfigError::Invalid(
                "historyItemsPerPage must be greater than 0".to_string(),
            ));
        }

        if !(self.click_value.is_finite() && self.click_value > 0.0) {
            return Err(ConfigError::Invalid(
                "clickValue must be a positive number".to_string(),
            ));
        }

        Ok(())
    }
}

// Default value functions for serde

fn default_max_history_items() -> usize {
    MAX_HISTORY_ITEMS
}

fn default_history_items_per_page() -> usize {
    HISTORY_ITEMS_PER_PAGE
}

fn default_click_value() -> f64 {
    0.25 // 1/4 MOA
}
