//! Data models for the calculation history.
//!
//! This module defines the saved calculation record, the grouping key shared
//! by every part of the history, and the history error type.

use crate::calculators::{compute_joule, CalculationError};
use crate::units::{UnitLabel, UnitSystem};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of calculations kept in history.
pub const MAX_HISTORY_ITEMS: usize = 50;

/// Returns the group key of a weight: the weight formatted with two decimals.
///
/// Grouping, group deletion, averages and export all go through this
/// function, so `0.197` and `0.203` always land in the same `"0.20"` group.
///
/// Rounding is half-up on the exact binary value: `0.125` is `"0.13"`, while
/// `0.205` (stored as `0.20499999...`) is `"0.20"`.
pub fn group_key(weight: f64) -> String {
    // A value lies exactly halfway between two hundredths only when it is an
    // odd number of eighths. `{:.2}` would round those to even.
    let eighths = weight.abs() * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 && eighths < EXACT_TIE_LIMIT {
        let hundredths = (weight.abs() * 100.0).ceil() as u64;
        let sign = if weight < 0.0 { "-" } else { "" };
        return format!("{}{}.{:02}", sign, hundredths / 100, hundredths % 100);
    }
    format!("{:.2}", weight)
}

/// Above this many eighths, `weight * 100` is no longer exact.
const EXACT_TIE_LIMIT: f64 = (1u64 << 50) as f64;

/// The record with the highest energy. The first one found wins ties.
pub fn best_record(records: &[CalculationRecord]) -> Option<&CalculationRecord> {
    records.iter().fold(None, |best: Option<&CalculationRecord>, record| match best {
        Some(b) if b.joule() >= record.joule() => Some(b),
        _ => Some(record),
    })
}

/// A single saved energy calculation.
///
/// Records are immutable once created. They can only be built through
/// [`CalculationRecord::from_measurement`] or [`CalculationRecord::at`],
/// which reject non-positive or non-finite values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationRecord {
    id: String,
    weight_original: f64,
    velocity_original: f64,
    unit_label: UnitLabel,
    joule: f64,
    timestamp: DateTime<Utc>,
}

impl CalculationRecord {
    /// Computes the energy of a measurement and wraps it in a new record
    /// stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError::InvalidInput`] for non-positive or
    /// non-finite weight or velocity.
    pub fn from_measurement(
        weight: f64,
        velocity: f64,
        system: UnitSystem,
    ) -> Result<Self, CalculationError> {
        Self::at(weight, velocity, system, Utc::now())
    }

    /// Same as [`from_measurement`](Self::from_measurement) with an explicit
    /// creation time.
    pub fn at(
        weight: f64,
        velocity: f64,
        system: UnitSystem,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, CalculationError> {
        let joule = compute_joule(weight, velocity, system)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            weight_original: weight,
            velocity_original: velocity,
            unit_label: system.label(),
            joule,
            timestamp,
        })
    }

    /// Unique identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Weight as entered, in the record's unit system.
    pub fn weight(&self) -> f64 {
        self.weight_original
    }

    /// Velocity as entered, in the record's unit system.
    pub fn velocity(&self) -> f64 {
        self.velocity_original
    }

    /// Unit pair the record was created with.
    pub fn unit_label(&self) -> UnitLabel {
        self.unit_label
    }

    /// Kinetic energy in joules.
    pub fn joule(&self) -> f64 {
        self.joule
    }

    /// Creation time.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Group this record belongs to.
    pub fn group_key(&self) -> String {
        group_key(self.weight_original)
    }

    /// Returns `true` if every numeric field is positive and finite.
    ///
    /// Used to screen records read back from storage.
    pub fn is_valid(&self) -> bool {
        [self.weight_original, self.velocity_original, self.joule]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
            && !self.id.is_empty()
    }
}

/// Errors that can occur during history operations.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Reading or writing the persisted history failed.
    #[error("history storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// The persisted history could not be encoded or decoded.
    #[error("history serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The history is at capacity; the record was not saved.
    #[error("history is full: {current} entries (max: {max})")]
    CapacityExceeded {
        /// Current number of entries
        current: usize,
        /// Maximum allowed entries
        max: usize,
    },

    /// The history could not be written as CSV.
    #[error("failed to export history as CSV: {0}")]
    Export(#[from] csv::Error),

    /// No location could be determined for the history file.
    #[error("could not determine a configuration directory for the history file")]
    NoHistoryLocation,
}

impl HistoryError {
    /// Returns `true` for failures of the persistence layer.
    ///
    /// After such a failure the in-memory history is still authoritative for
    /// the current session, but changes will not survive a reload.
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            HistoryError::Storage(_) | HistoryError::Serialization(_) | HistoryError::NoHistoryLocation
        )
    }
}
