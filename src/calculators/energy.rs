//! Kinetic energy and its inverse.

use super::error::{require_positive, CalculationError};
use crate::units::{UnitSystem, FPS_TO_MPS};
use serde::{Deserialize, Serialize};

/// Velocity expressed in both unit systems.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityPair {
    /// Meters per second.
    pub mps: f64,
    /// Feet per second.
    pub fps: f64,
}

/// Computes the kinetic energy in joules of a projectile.
///
/// `weight` is in grams (metric) or grains (imperial), `velocity` in m/s or
/// fps depending on `system`.
///
/// # Errors
///
/// Returns [`CalculationError::InvalidInput`] when either input is not a
/// positive finite number.
///
/// # Example
///
/// ```
/// use joule_calc::calculators::compute_joule;
/// use joule_calc::units::UnitSystem;
///
/// let joule = compute_joule(0.25, 90.0, UnitSystem::Metric).unwrap();
/// assert!((joule - 1.0125).abs() < 1e-9);
/// ```
pub fn compute_joule(weight: f64, velocity: f64, system: UnitSystem) -> Result<f64, CalculationError> {
    let weight = require_positive("weight", weight)?;
    let velocity = require_positive("velocity", velocity)?;

    let weight_kg = system.weight_to_grams(weight) / 1000.0;
    let velocity_mps = system.velocity_to_mps(velocity);

    Ok(0.5 * weight_kg * velocity_mps * velocity_mps)
}

/// Computes the velocity a projectile of `weight` needs to carry `joule` of energy.
///
/// # Errors
///
/// Returns [`CalculationError::InvalidInput`] when `joule` or `weight` is not
/// a positive finite number.
pub fn compute_inverse_velocity(
    joule: f64,
    weight: f64,
    system: UnitSystem,
) -> Result<VelocityPair, CalculationError> {
    let joule = require_positive("joule", joule)?;
    let weight = require_positive("weight", weight)?;

    let weight_kg = system.weight_to_grams(weight) / 1000.0;
    let mps = (2.0 * joule / weight_kg).sqrt();

    Ok(VelocityPair {
        mps,
        fps: mps / FPS_TO_MPS,
    })
}
