//! Joule-Calc: airsoft ballistic calculator
//!
//! Computes the kinetic energy of a BB from its weight and muzzle velocity,
//! the velocity that yields a target energy, and the turret corrections for
//! a measured point-of-impact deviation. Energy calculations are kept in a
//! capacity-bounded history that is grouped by BB weight for display.
//!
//! # Architecture
//!
//! - **units**: Metric/imperial unit systems and conversions
//! - **calculators**: Energy, inverse velocity and sight correction formulas
//! - **history**: Record model, persistent store, grouping/pagination
//!   projection, rendering and export
//! - **config**: User settings loaded from a JSON settings object
//! - **commands**: [`commands::HistorySession`], the mutation surface that
//!   keeps the store and view state in step
//!
//! # Example
//!
//! ```
//! use joule_calc::commands::{HistorySession, SaveOutcome};
//! use joule_calc::history::{HistoryStore, MemoryStorage, ViewMode, ViewState};
//! use joule_calc::units::UnitSystem;
//!
//! let mut session = HistorySession::new(
//!     HistoryStore::new(MemoryStorage::new()),
//!     ViewState::default(),
//! );
//!
//! let result = session.calculate_and_save(0.20, 100.0, UnitSystem::Metric).unwrap();
//! assert!((result.joule - 1.0).abs() < 1e-9);
//! assert!(matches!(result.outcome, SaveOutcome::Saved { .. }));
//!
//! let projection = session.projection(ViewMode::Paginated);
//! assert_eq!(projection.groups()[0].key, "0.20");
//! ```

pub mod calculators;
pub mod commands;
pub mod config;
pub mod history;
pub mod units;

pub use calculators::{compute_inverse_velocity, compute_joule, compute_sight_correction};
pub use commands::{CommandError, HistorySession};
pub use units::UnitSystem;
