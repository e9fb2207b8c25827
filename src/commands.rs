//! Command handlers for Joule-Calc.
//!
//! [`HistorySession`] is the single mutation surface a front end talks to.
//! It owns the history store and the per-session view state, and applies the
//! matching view adjustment after every store mutation so the projection
//! handed to the renderer always reflects both.

use crate::calculators::CalculationError;
use crate::config::{get_config, ConfigError};
use crate::history::{
    project, CalculationRecord, HistoryError, HistoryStorage, HistoryStore, JsonFileStorage,
    Projection, SortMode, ViewMode, ViewState,
};
use crate::units::UnitSystem;
use thiserror::Error;

/// Error types for command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The input could not be converted.
    #[error(transparent)]
    Calculation(#[from] CalculationError),

    /// A history operation failed.
    #[error(transparent)]
    History(#[from] HistoryError),

    /// The configuration is invalid or unreadable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What happened to a computed energy value.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The record was added and persisted.
    Saved {
        /// Id of the new record
        id: String,
    },
    /// The history is full; the value was computed but not saved.
    HistoryFull {
        /// Capacity of the history
        max: usize,
    },
    /// The record was added for this session but could not be persisted.
    NotPersisted {
        /// Id of the new record
        id: String,
        /// Description of the persistence failure
        reason: String,
    },
}

impl SaveOutcome {
    /// Human-readable status line.
    pub fn status_message(&self) -> String {
        match self {
            SaveOutcome::Saved { .. } => "Calculation saved to history!".to_string(),
            SaveOutcome::HistoryFull { max } => {
                format!("History full ({} records)! Calculation not saved.", max)
            }
            SaveOutcome::NotPersisted { reason, .. } => format!(
                "Calculation kept for this session but could not be saved: {}",
                reason
            ),
        }
    }
}

/// Result of an energy calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyResult {
    /// Computed energy in joules, available even if it was not saved.
    pub joule: f64,
    /// What happened to the history.
    pub outcome: SaveOutcome,
}

/// History store plus the view state of one session.
#[derive(Debug)]
pub struct HistorySession<S: HistoryStorage> {
    store: HistoryStore<S>,
    view: ViewState,
}

impl HistorySession<JsonFileStorage> {
    /// Opens the history file from the global configuration and loads it.
    ///
    /// A persisted history that cannot be decoded is moved to a `.bak` file
    /// next to it and the session starts empty; a file that cannot be read
    /// at all is an error.
    pub fn from_config() -> Result<Self, CommandError> {
        let config = get_config();
        let storage = JsonFileStorage::from_config()?;
        log::debug!("Using history file {}", storage.path().display());

        let mut session = Self::new(
            HistoryStore::with_capacity(storage, config.max_history_items),
            ViewState::new(config.history_items_per_page),
        );

        match session.load() {
            Ok(count) => log::debug!("Loaded {} record(s) from history", count),
            Err(HistoryError::Serialization(e)) => {
                let backup = session.store.storage().back_up()?;
                log::warn!(
                    "History file is unreadable ({}); moved it to {} and starting empty",
                    e,
                    backup.display()
                );
            }
            Err(e) => return Err(e.into()),
        }
        Ok(session)
    }
}

impl<S: HistoryStorage> HistorySession<S> {
    /// Wraps a store and view state.
    pub fn new(store: HistoryStore<S>, view: ViewState) -> Self {
        Self { store, view }
    }

    /// The underlying store.
    pub fn store(&self) -> &HistoryStore<S> {
        &self.store
    }

    /// The current view state.
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Saved records, newest first.
    pub fn records(&self) -> &[CalculationRecord] {
        self.store.records()
    }

    /// Reloads persisted history and resets the view to the first page.
    pub fn load(&mut self) -> Result<usize, HistoryError> {
        let count = self.store.load()?;
        self.view.reset_pagination();
        Ok(count)
    }

    /// Computes the energy of a measurement and saves it if there is room.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Calculation` for invalid input; the history is
    /// not touched in that case. A full history or a failed write is not an
    /// error: the value is returned with the matching [`SaveOutcome`].
    pub fn calculate_and_save(
        &mut self,
        weight: f64,
        velocity: f64,
        system: UnitSystem,
    ) -> Result<EnergyResult, CommandError> {
        let record = CalculationRecord::from_measurement(weight, velocity, system)?;
        let joule = record.joule();
        let id = record.id().to_string();

        if self.store.is_full() {
            return Ok(EnergyResult {
                joule,
                outcome: SaveOutcome::HistoryFull {
                    max: self.store.capacity(),
                },
            });
        }

        let outcome = match self.store.add(record) {
            Ok(()) => SaveOutcome::Saved { id },
            Err(HistoryError::CapacityExceeded { max, .. }) => SaveOutcome::HistoryFull { max },
            Err(e) => SaveOutcome::NotPersisted {
                id,
                reason: e.to_string(),
            },
        };

        if !matches!(outcome, SaveOutcome::HistoryFull { .. }) {
            self.view.on_record_added();
        }

        Ok(EnergyResult { joule, outcome })
    }

    /// Removes one record. Returns `false` if the id was unknown.
    pub fn remove(&mut self, id: &str) -> Result<bool, HistoryError> {
        let result = self.store.remove(id);
        let removed = match &result {
            Ok(removed) => *removed,
            // The record is gone from memory even though the write failed
            Err(e) => e.is_persistence_failure(),
        };
        if removed {
            self.view.on_record_removed();
        }
        result
    }

    /// Removes every record of a weight group. Returns the number removed.
    pub fn remove_group(&mut self, key: &str) -> Result<usize, HistoryError> {
        let result = self.store.remove_group(key);
        self.view.on_group_removed(key);
        result
    }

    /// Removes every record.
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        let result = self.store.clear();
        self.view.on_cleared();
        result
    }

    /// Changes a group's sort mode; pagination restarts at the first page.
    pub fn set_sort_mode(&mut self, key: &str, mode: SortMode) {
        self.view.set_sort_mode(key, mode);
    }

    /// Reveals one more page.
    pub fn load_more(&mut self) {
        self.view.load_more();
    }

    /// Collapses or expands a group. Returns the new collapsed flag.
    pub fn toggle_collapsed(&mut self, key: &str) -> bool {
        self.view.toggle_collapsed(key)
    }

    /// Builds the current projection.
    pub fn projection(&self, mode: ViewMode) -> Projection {
        project(self.store.records(), &self.view, mode)
    }
}
