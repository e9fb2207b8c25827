//! Calculation history tracking and persistence.
//!
//! This module keeps the saved energy calculations, groups them by
//! projectile weight for display, and writes them to persistent storage
//! after every change.
//!
//! # Features
//!
//! - Capacity-bounded store ([`MAX_HISTORY_ITEMS`] records, newest first)
//! - Whole-collection JSON persistence with atomic file replacement
//! - Grouping by two-decimal weight with per-group sort modes
//! - Paginated projections for rendering
//! - CSV and plain-text export
//!
//! # Example
//!
//! ```
//! use joule_calc::history::{project, CalculationRecord, HistoryStore, MemoryStorage, ViewMode, ViewState};
//! use joule_calc::units::UnitSystem;
//!
//! let mut store = HistoryStore::new(MemoryStorage::new());
//! store.add(CalculationRecord::from_measurement(0.20, 100.0, UnitSystem::Metric).unwrap()).unwrap();
//!
//! let projection = project(store.records(), &ViewState::default(), ViewMode::Paginated);
//! assert_eq!(projection.groups()[0].key, "0.20");
//! ```

pub mod export;
pub mod models;
pub mod projection;
pub mod storage;
pub mod store;
pub mod ui;

// Re-export commonly used types
pub use export::{csv_file_name, group_text, share_text, to_csv};
pub use models::{best_record, group_key, CalculationRecord, HistoryError, MAX_HISTORY_ITEMS};
pub use projection::{
    flatten_sorted, group_order, project, GroupView, LoadMore, Projection, SortMode, ViewMode,
    ViewState, HISTORY_ITEMS_PER_PAGE,
};
pub use storage::{get_history_file_path, HistoryStorage, JsonFileStorage, MemoryStorage};
pub use store::HistoryStore;
pub use ui::{format_best_result, format_projection, format_record};
