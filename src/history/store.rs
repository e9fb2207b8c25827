//! The history store.
//!
//! [`HistoryStore`] owns the ordered record collection (newest first),
//! enforces the capacity bound and writes the whole collection to its
//! [`HistoryStorage`] after every mutation.

use super::models::{best_record, group_key, CalculationRecord, HistoryError, MAX_HISTORY_ITEMS};
use super::storage::HistoryStorage;
use serde_json::Value;

/// Ordered, capacity-bounded collection of calculation records.
#[derive(Debug)]
pub struct HistoryStore<S: HistoryStorage> {
    records: Vec<CalculationRecord>,
    capacity: usize,
    storage: S,
}

impl<S: HistoryStorage> HistoryStore<S> {
    /// Creates an empty store with the default capacity of
    /// [`MAX_HISTORY_ITEMS`]. Call [`load`](Self::load) to rehydrate.
    pub fn new(storage: S) -> Self {
        Self::with_capacity(storage, MAX_HISTORY_ITEMS)
    }

    /// Creates an empty store that accepts new records only while it holds
    /// fewer than `capacity`.
    ///
    /// The capacity is clamped to `1..=MAX_HISTORY_ITEMS`. It gates
    /// [`add`](Self::add) only; [`load`](Self::load) keeps up to
    /// [`MAX_HISTORY_ITEMS`] persisted records so lowering the capacity never
    /// discards saved history.
    pub fn with_capacity(storage: S, capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity: capacity.clamp(1, MAX_HISTORY_ITEMS),
            storage,
        }
    }

    /// Records, newest first.
    pub fn records(&self) -> &[CalculationRecord] {
        &self.records
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum number of records.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if another record would exceed the capacity.
    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    /// Looks up a record by id.
    pub fn get(&self, id: &str) -> Option<&CalculationRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// All records of one group, in store order.
    pub fn group(&self, key: &str) -> Vec<&CalculationRecord> {
        self.records.iter().filter(|r| r.group_key() == key).collect()
    }

    /// The record with the highest energy. The first one found wins ties.
    pub fn best(&self) -> Option<&CalculationRecord> {
        best_record(&self.records)
    }

    /// The storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Prepends a record and persists the collection.
    ///
    /// # Errors
    ///
    /// - `HistoryError::CapacityExceeded` if the store is full; nothing changes
    /// - a persistence error if the write fails; the record stays in memory
    pub fn add(&mut self, record: CalculationRecord) -> Result<(), HistoryError> {
        if self.is_full() {
            log::debug!(
                "Rejecting record {}: history full ({}/{})",
                record.id(),
                self.records.len(),
                self.capacity
            );
            return Err(HistoryError::CapacityExceeded {
                current: self.records.len(),
                max: self.capacity,
            });
        }

        log::debug!(
            "Adding record {} ({:.3} J) to group {}",
            record.id(),
            record.joule(),
            record.group_key()
        );
        self.records.insert(0, record);
        self.persist()
    }

    /// Removes the record with `id`.
    ///
    /// Returns `Ok(false)` without writing if no such record exists.
    pub fn remove(&mut self, id: &str) -> Result<bool, HistoryError> {
        let before = self.records.len();
        self.records.retain(|r| r.id() != id);

        if self.records.len() == before {
            log::debug!("Record {} not found; nothing removed", id);
            return Ok(false);
        }

        log::debug!("Removed record {}", id);
        self.persist()?;
        Ok(true)
    }

    /// Removes every record whose group key equals `key`.
    ///
    /// Returns the number of records removed.
    pub fn remove_group(&mut self, key: &str) -> Result<usize, HistoryError> {
        let before = self.records.len();
        self.records.retain(|r| group_key(r.weight()) != key);
        let removed = before - self.records.len();

        log::debug!("Removed {} record(s) from group {}", removed, key);
        self.persist()?;
        Ok(removed)
    }

    /// Removes every record.
    pub fn clear(&mut self) -> Result<(), HistoryError> {
        log::debug!("Clearing {} record(s)", self.records.len());
        self.records.clear();
        self.persist()
    }

    /// Replaces the in-memory records with the persisted collection.
    ///
    /// Missing data leaves the store empty. Records that fail to decode or
    /// carry non-positive values are skipped. If more than
    /// [`MAX_HISTORY_ITEMS`] records were persisted, only the first
    /// [`MAX_HISTORY_ITEMS`] are kept.
    ///
    /// Returns the number of records loaded.
    ///
    /// # Errors
    ///
    /// Returns a persistence error if the storage cannot be read or does not
    /// hold a JSON array. The in-memory records are left untouched.
    pub fn load(&mut self) -> Result<usize, HistoryError> {
        let Some(serialized) = self.storage.read_all()? else {
            self.records.clear();
            return Ok(0);
        };

        let values: Vec<Value> = serde_json::from_str(&serialized)?;
        let mut records = Vec::with_capacity(values.len().min(MAX_HISTORY_ITEMS));
        let mut skipped = 0;

        for (index, value) in values.into_iter().enumerate() {
            match serde_json::from_value::<CalculationRecord>(value) {
                Ok(record) if record.is_valid() => records.push(record),
                Ok(record) => {
                    skipped += 1;
                    log::warn!(
                        "Skipping invalid history record {} at position {}",
                        record.id(),
                        index
                    );
                }
                Err(e) => {
                    skipped += 1;
                    log::warn!("Skipping corrupted history record at position {}: {}", index, e);
                }
            }
        }

        if records.len() > MAX_HISTORY_ITEMS {
            log::warn!(
                "Persisted history holds {} records; keeping the newest {}",
                records.len(),
                MAX_HISTORY_ITEMS
            );
            records.truncate(MAX_HISTORY_ITEMS);
        } else if records.len() > self.capacity {
            log::debug!(
                "Loaded {} records over the configured limit of {}; new records will be rejected",
                records.len(),
                self.capacity
            );
        }

        if skipped > 0 && skipped > records.len() {
            log::warn!(
                "History has significant corruption ({} skipped, {} valid records)",
                skipped,
                records.len()
            );
        }

        self.records = records;
        Ok(self.records.len())
    }

    /// Writes the whole collection to storage.
    pub fn persist(&mut self) -> Result<(), HistoryError> {
        let serialized = serde_json::to_string(&self.records)?;
        self.storage.write_all(&serialized).map_err(|e| {
            log::warn!("Failed to persist history: {}", e);
            e
        })
    }
}
