//! Error types for the conversion engine.

use thiserror::Error;

/// Errors raised by the conversion functions.
///
/// Conversions either succeed completely or fail with one of these; no
/// partial result is ever returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    /// A numeric input was zero, negative, NaN or infinite.
    #[error("invalid {field}: {value} (must be a positive, finite number)")]
    InvalidInput {
        /// Name of the offending input
        field: &'static str,
        /// The rejected value
        value: f64,
    },

    /// Both sight deviations were zero or negative, so there is nothing to correct.
    #[error("no deviation to correct: drop and drift are both zero or negative")]
    NoDeviation,
}

impl CalculationError {
    /// Returns the name of the rejected field, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            CalculationError::InvalidInput { field, .. } => Some(field),
            CalculationError::NoDeviation => None,
        }
    }
}

/// Checks that `value` is finite and strictly positive.
pub(crate) fn require_positive(field: &'static str, value: f64) -> Result<f64, CalculationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(CalculationError::InvalidInput { field, value })
    }
}
