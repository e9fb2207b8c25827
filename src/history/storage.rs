//! Persistent storage for the calculation history.
//!
//! The history is persisted as one serialized JSON array holding the whole
//! collection. Every write replaces the previous contents in a single step,
//! so a failed write leaves the last successful state intact.

use super::models::HistoryError;
use crate::config::get_config;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Name of the history file inside the application config directory.
pub const HISTORY_FILE_NAME: &str = "history.json";

/// Backend holding the serialized history.
///
/// The store calls these synchronously after each mutation. Implementations
/// must make `write_all` all-or-nothing.
pub trait HistoryStorage {
    /// Reads the serialized collection, or `None` if nothing was saved yet.
    fn read_all(&self) -> Result<Option<String>, HistoryError>;

    /// Replaces the serialized collection.
    fn write_all(&mut self, serialized: &str) -> Result<(), HistoryError>;
}

/// Storage kept in memory only. Used by tests and by sessions that should
/// not touch the disk.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    contents: Option<String>,
    writes: usize,
}

impl MemoryStorage {
    /// Creates empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-populated with serialized history.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Some(contents.into()),
            writes: 0,
        }
    }

    /// The last written contents.
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl HistoryStorage for MemoryStorage {
    fn read_all(&self) -> Result<Option<String>, HistoryError> {
        Ok(self.contents.clone())
    }

    fn write_all(&mut self, serialized: &str) -> Result<(), HistoryError> {
        self.contents = Some(serialized.to_string());
        self.writes += 1;
        Ok(())
    }
}

/// Storage backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Uses the file at `path`. Parent directories are created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses the configured history file, or the default location.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::NoHistoryLocation` if no configuration
    /// directory can be determined.
    pub fn from_config() -> Result<Self, HistoryError> {
        Ok(Self::new(get_history_file_path()?))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path the file is moved to by [`back_up`](Self::back_up): the file
    /// name with `.bak` appended.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".bak");
        self.path.with_file_name(name)
    }

    /// Moves the current file aside so the next write starts fresh.
    ///
    /// An existing backup is replaced. Returns the backup path.
    pub fn back_up(&self) -> Result<PathBuf, HistoryError> {
        let backup = self.backup_path();
        fs::rename(&self.path, &backup)?;
        log::debug!("Moved {} to {}", self.path.display(), backup.display());
        Ok(backup)
    }
}

impl HistoryStorage for JsonFileStorage {
    fn read_all(&self) -> Result<Option<String>, HistoryError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(contents))
    }

    fn write_all(&mut self, serialized: &str) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write to a temporary file first
        let temp_path = self.path.with_extension("json.tmp");
        let mut temp_file = File::create(&temp_path)?;
        temp_file.write_all(serialized.as_bytes())?;
        temp_file.flush()?;
        drop(temp_file);

        // Atomically replace the old file with the new one
        fs::rename(&temp_path, &self.path)?;

        log::debug!(
            "Wrote {} bytes of history to {}",
            serialized.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Gets the history file path.
///
/// Returns the configured `historyFile` if set, otherwise
/// `<config dir>/joule-calc/history.json` (for example
/// `~/.config/joule-calc/history.json` on Linux).
///
/// # Errors
///
/// Returns `HistoryError::NoHistoryLocation` if no config directory exists
/// for the current platform.
pub fn get_history_file_path() -> Result<PathBuf, HistoryError> {
    if let Some(path) = get_config().history_file {
        return Ok(path);
    }
    default_history_file_path()
}

fn default_history_file_path() -> Result<PathBuf, HistoryError> {
    let config_dir = dirs::config_dir().ok_or(HistoryError::NoHistoryLocation)?;
    Ok(config_dir.join("joule-calc").join(HISTORY_FILE_NAME))
}
