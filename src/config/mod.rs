//! Configuration management for Joule-Calc.
//!
//! This module provides configuration loading, validation, and access through a singleton pattern.
//! Configuration is loaded from a JSON settings object under the "joule-calc" key and merged
//! with defaults.

pub mod schema;

pub use schema::{ConfigError, JouleCalcConfig};

use once_cell::sync::Lazy;
use serde_json::Value;
use std::path::Path;
use std::sync::RwLock;

/// Key of the Joule-Calc section in a settings object.
pub const SETTINGS_KEY: &str = "joule-calc";

/// Global configuration instance.
///
/// This is lazily initialized on first access and can be updated when settings change.
static CONFIG: Lazy<RwLock<JouleCalcConfig>> =
    Lazy::new(|| RwLock::new(JouleCalcConfig::default()));

/// Loads configuration from a JSON settings value.
///
/// Reads the "joule-calc" section, merges it over the defaults, validates
/// the result, and updates the global configuration. A section that cannot
/// be parsed is logged and ignored.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` if the merged configuration fails
/// validation. The global configuration is left unchanged in that case.
///
/// # Example
///
/// ```no_run
/// use joule_calc::config::load_config;
/// use serde_json::json;
///
/// let settings = json!({
///     "joule-calc": {
///         "unitSystem": "imperial",
///         "historyItemsPerPage": 20
///     }
/// });
///
/// let config = load_config(Some(settings)).unwrap();
/// assert_eq!(config.history_items_per_page, 20);
/// ```
pub fn load_config(settings_json: Option<Value>) -> Result<JouleCalcConfig, ConfigError> {
    let mut config = JouleCalcConfig::default();

    if let Some(section) = settings_json.as_ref().and_then(|s| s.get(SETTINGS_KEY)) {
        match serde_json::from_value::<JouleCalcConfig>(section.clone()) {
            Ok(user_config) => config = user_config,
            Err(e) => {
                log::warn!(
                    "Failed to parse {} settings: {}. Using defaults.",
                    SETTINGS_KEY,
                    e
                );
            }
        }
    }

    config.validate()?;

    if let Ok(mut global_config) = CONFIG.write() {
        *global_config = config.clone();
    }

    log::debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

/// Loads configuration from a JSON settings file.
///
/// The file holds a settings object with a "joule-calc" section, the same
/// shape [`load_config`] accepts.
///
/// # Errors
///
/// Returns `ConfigError::Read` or `ConfigError::Parse` if the file cannot be
/// read or is not JSON, and `ConfigError::Invalid` if validation fails.
pub fn load_config_file(path: &Path) -> Result<JouleCalcConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: Value = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    load_config(Some(settings))
}

/// Gets the current global configuration.
///
/// Returns the default configuration if none has been loaded yet.
pub fn get_config() -> JouleCalcConfig {
    CONFIG
        .read()
        .map(|c| c.clone())
        .unwrap_or_else(|_| JouleCalcConfig::default())
}

/// Updates the global configuration in place.
///
/// If the result fails validation, the configuration reverts to defaults.
///
/// # Example
///
/// ```no_run
/// use joule_calc::config::update_config;
/// use joule_calc::units::UnitSystem;
///
/// update_config(|config| {
///     config.unit_system = UnitSystem::Imperial;
/// });
/// ```
pub fn update_config<F>(updater: F)
where
    F: FnOnce(&mut JouleCalcConfig),
{
    if let Ok(mut config) = CONFIG.write() {
        updater(&mut config);

        if let Err(e) = config.validate() {
            log::warn!("Configuration validation failed after update: {}", e);
            *config = JouleCalcConfig::default();
        }
    }
}

/// Resets the configuration to defaults.
pub fn reset_config() {
    if let Ok(mut config) = CONFIG.write() {
        *config = JouleCalcConfig::default();
    }
}
