//! Unit systems and conversion constants.
//!
//! Weights and velocities are entered either in grams and meters per second
//! (metric) or in grains and feet per second (imperial). Every calculation is
//! carried out in SI units; the unit system only decides how raw input is
//! interpreted and how a saved record is labelled.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grams per grain.
pub const GRAIN_TO_GRAM: f64 = 0.06479891;

/// Meters per second per foot per second.
pub const FPS_TO_MPS: f64 = 0.3048;

/// Unit system used to interpret weight and velocity input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Grams and meters per second.
    #[default]
    Metric,
    /// Grains and feet per second.
    Imperial,
}

impl UnitSystem {
    /// Label stamped on records created under this system.
    pub fn label(self) -> UnitLabel {
        match self {
            UnitSystem::Metric => UnitLabel::GramsMps,
            UnitSystem::Imperial => UnitLabel::GrainsFps,
        }
    }

    /// Converts a weight in this system to grams.
    pub fn weight_to_grams(self, weight: f64) -> f64 {
        match self {
            UnitSystem::Metric => weight,
            UnitSystem::Imperial => weight * GRAIN_TO_GRAM,
        }
    }

    /// Converts a velocity in this system to meters per second.
    pub fn velocity_to_mps(self, velocity: f64) -> f64 {
        match self {
            UnitSystem::Metric => velocity,
            UnitSystem::Imperial => velocity * FPS_TO_MPS,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitSystem::Metric => write!(f, "metric"),
            UnitSystem::Imperial => write!(f, "imperial"),
        }
    }
}

impl FromStr for UnitSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            other => Err(format!("unknown unit system '{}'", other)),
        }
    }
}

/// Display unit pair recorded on a saved calculation.
///
/// The label is fixed when the record is created. Switching the active
/// [`UnitSystem`] later never relabels existing records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitLabel {
    /// Grams and meters per second.
    #[serde(rename = "g/mps")]
    GramsMps,
    /// Grains and feet per second.
    #[serde(rename = "gr/fps")]
    GrainsFps,
}

impl UnitLabel {
    /// Short weight unit, e.g. `g`.
    pub fn weight_unit(self) -> &'static str {
        match self {
            UnitLabel::GramsMps => "g",
            UnitLabel::GrainsFps => "gr",
        }
    }

    /// Short velocity unit, e.g. `m/s`.
    pub fn velocity_unit(self) -> &'static str {
        match self {
            UnitLabel::GramsMps => "m/s",
            UnitLabel::GrainsFps => "fps",
        }
    }

    /// The wire tag, `g/mps` or `gr/fps`.
    pub fn as_str(self) -> &'static str {
        match self {
            UnitLabel::GramsMps => "g/mps",
            UnitLabel::GrainsFps => "gr/fps",
        }
    }
}

impl fmt::Display for UnitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
