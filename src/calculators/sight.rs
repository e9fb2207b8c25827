//! Sight corrections in MOA or MRAD.
//!
//! Converts the linear deviation observed on target (centimeters) at a known
//! distance (meters) into an angular correction and a number of turret clicks.
//! Elevation and windage are computed independently.

use super::error::{require_positive, CalculationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subtension of one MOA at 100 meters, in centimeters.
pub const MOA_AT_100M_IN_CM: f64 = 2.9089;

/// Common MOA turret click values.
pub const MOA_CLICK_OPTIONS: &[(&str, f64)] = &[
    ("1/4 MOA per click", 0.25),
    ("1/2 MOA per click", 0.5),
    ("1/8 MOA per click", 0.125),
    ("1 MOA per click", 1.0),
];

/// Common MRAD turret click values.
pub const MRAD_CLICK_OPTIONS: &[(&str, f64)] = &[
    ("0.1 MRAD per click", 0.1),
    ("0.05 MRAD per click", 0.05),
];

/// Angular unit of an optic's turrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpticUnit {
    /// Minute of angle.
    #[default]
    Moa,
    /// Milliradian.
    Mrad,
}

impl OpticUnit {
    /// Click values offered for this unit.
    pub fn click_options(self) -> &'static [(&'static str, f64)] {
        match self {
            OpticUnit::Moa => MOA_CLICK_OPTIONS,
            OpticUnit::Mrad => MRAD_CLICK_OPTIONS,
        }
    }

    /// Default click value for this unit (the first offered option).
    pub fn default_click_value(self) -> f64 {
        self.click_options()[0].1
    }
}

impl fmt::Display for OpticUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpticUnit::Moa => write!(f, "MOA"),
            OpticUnit::Mrad => write!(f, "MRAD"),
        }
    }
}

impl FromStr for OpticUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "moa" => Ok(OpticUnit::Moa),
            "mrad" => Ok(OpticUnit::Mrad),
            other => Err(format!("unknown optic unit '{}'", other)),
        }
    }
}

/// Input for [`compute_sight_correction`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SightParams {
    /// Turret unit.
    pub unit: OpticUnit,
    /// Distance to target in meters.
    pub distance: f64,
    /// Vertical deviation in centimeters.
    pub drop: f64,
    /// Horizontal deviation in centimeters.
    pub drift: f64,
    /// Angular value of one click, in `unit`.
    pub click_value: f64,
}

/// Correction along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisCorrection {
    /// Angular correction in the optic's unit.
    pub value: f64,
    /// Number of clicks (fractional).
    pub clicks: f64,
}

/// Elevation and windage corrections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SightCorrection {
    /// Vertical axis.
    pub elevation: AxisCorrection,
    /// Horizontal axis.
    pub windage: AxisCorrection,
}

/// Computes click corrections for an observed impact deviation.
///
/// A deviation of zero or less on one axis yields a zero correction for that
/// axis.
///
/// # Errors
///
/// - [`CalculationError::InvalidInput`] if `distance` or `click_value` is not
///   a positive finite number
/// - [`CalculationError::NoDeviation`] if both deviations are zero or negative
pub fn compute_sight_correction(params: &SightParams) -> Result<SightCorrection, CalculationError> {
    let distance = require_positive("distance", params.distance)?;
    let click_value = require_positive("click value", params.click_value)?;

    // NaN deviations compare false both ways and count as "no deviation"
    if !(params.drop > 0.0) && !(params.drift > 0.0) {
        return Err(CalculationError::NoDeviation);
    }

    let correct = |deviation: f64| -> AxisCorrection {
        if !(deviation > 0.0) {
            return AxisCorrection::default();
        }
        let value = match params.unit {
            OpticUnit::Mrad => deviation / (distance / 10.0),
            OpticUnit::Moa => (deviation / distance) * 100.0 / MOA_AT_100M_IN_CM,
        };
        AxisCorrection {
            value,
            clicks: value / click_value,
        }
    };

    Ok(SightCorrection {
        elevation: correct(params.drop),
        windage: correct(params.drift),
    })
}
