//! Persisted record of already-notified entries
//!
//! The store maps each polled listing URL to its most recent entries, newest
//! first, capped at `max_entries`. The whole mapping is rewritten after every
//! append so the file always mirrors memory. A crash between the in-memory
//! append and the write loses that one update; on restart the episode is
//! notified again.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::errors::{HistoryError, HistoryResult};
use crate::models::Entry;

/// Source URL -> entries, newest first
pub type HistoryMap = BTreeMap<String, Vec<Entry>>;

pub struct HistoryStore {
    path: PathBuf,
    max_entries: usize,
    records: HistoryMap,
}

impl HistoryStore {
    /// Load the history file, starting empty when it does not exist.
    ///
    /// Unparseable content is returned as [`HistoryError::Corrupt`]; the caller
    /// is expected to stop rather than overwrite it.
    pub fn load<P: Into<PathBuf>>(path: P, max_entries: usize) -> HistoryResult<Self> {
        let path = path.into();

        let mut records = if path.exists() {
            let contents =
                std::fs::read_to_string(&path).map_err(|e| HistoryError::io(&path, e))?;
            serde_json::from_str::<HistoryMap>(&contents).map_err(|source| {
                HistoryError::Corrupt {
                    path: path.clone(),
                    source,
                }
            })?
        } else {
            debug!("No history file at {}, starting empty", path.display());
            HistoryMap::new()
        };

        for entries in records.values_mut() {
            entries.truncate(max_entries);
        }

        info!(
            "Loaded history for {} source(s) from {}",
            records.len(),
            path.display()
        );

        Ok(Self {
            path,
            max_entries,
            records,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries recorded for `url`, newest first
    pub fn entries(&self, url: &str) -> &[Entry] {
        self.records.get(url).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn records(&self) -> &HistoryMap {
        &self.records
    }

    pub fn is_known(&self, url: &str, candidate: &Entry) -> bool {
        self.entries(url)
            .iter()
            .any(|known| known.is_same_episode(candidate))
    }

    /// Prepend `entry` to the record for `url`, trim, then persist.
    ///
    /// The in-memory record is updated even if the write fails.
    pub fn append(&mut self, url: &str, entry: Entry) -> HistoryResult<()> {
        let record = self.records.entry(url.to_string()).or_default();
        record.retain(|known| !known.is_same_episode(&entry));
        record.insert(0, entry);
        record.truncate(self.max_entries);

        self.persist()
    }

    /// Write the full mapping, replacing the previous file atomically
    pub fn persist(&self) -> HistoryResult<()> {
        let json = serde_json::to_string_pretty(&self.records)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| HistoryError::io(dir, e))?;

        let mut file = NamedTempFile::new_in(dir).map_err(|e| HistoryError::io(dir, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| HistoryError::io(file.path(), e))?;

        // Temp files are created owner-only; keep the mode of the file being replaced
        if let Ok(existing) = std::fs::metadata(&self.path) {
            file.as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| HistoryError::io(file.path(), e))?;
        }
        file.persist(&self.path)
            .map_err(|e| HistoryError::io(&self.path, e.error))?;

        debug!("Persisted history to {}", self.path.display());
        Ok(())
    }
}
