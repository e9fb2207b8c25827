//! Conversion engine.
//!
//! Pure functions turning raw chronograph and target measurements into
//! energy, required velocity and sight corrections. Nothing in this module
//! holds state or touches the history.
//!
//! # Example
//!
//! ```
//! use joule_calc::calculators::compute_joule;
//! use joule_calc::units::UnitSystem;
//!
//! let joule = compute_joule(0.20, 100.0, UnitSystem::Metric).unwrap();
//! assert!((joule - 1.0).abs() < 1e-9);
//! ```

pub mod energy;
pub mod error;
pub mod sight;

pub use energy::{compute_inverse_velocity, compute_joule, VelocityPair};
pub use error::CalculationError;
pub use sight::{
    compute_sight_correction, AxisCorrection, OpticUnit, SightCorrection, SightParams,
    MOA_AT_100M_IN_CM, MOA_CLICK_OPTIONS, MRAD_CLICK_OPTIONS,
};
