//! Recent identification history.
//!
//! The whole history is one JSON array in one storage slot, newest first.
//! Every write replaces the slot; concurrent writers are not coordinated and
//! the last one wins.

use crate::models::HistoryEntry;
use crate::storage::{KeyValueStore, StorageError, StorageResult};
use tracing::{debug, warn};

/// Name of the slot holding the history.
pub const HISTORY_SLOT: &str = "plantHistory";

/// Number of entries kept.
pub const MAX_ENTRIES: usize = 10;

/// Bounded, most-recent-first history over a single storage slot.
pub struct HistoryStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Insert `entry` at the front and drop anything past the cap.
    ///
    /// Unreadable existing history is treated as empty and overwritten.
    pub fn append(&self, entry: HistoryEntry) -> StorageResult<()> {
        let mut entries = self.list();
        entries.insert(0, entry);
        entries.truncate(MAX_ENTRIES);

        let serialized = serde_json::to_string(&entries)?;
        self.store.set(HISTORY_SLOT, &serialized)?;

        debug!("History now holds {} entries", entries.len());
        Ok(())
    }

    /// Stored entries, newest first.
    ///
    /// Fails open: a missing, unreadable, or corrupt slot yields an empty list.
    pub fn list(&self) -> Vec<HistoryEntry> {
        match self.read_slot() {
            Ok(Some(entries)) => entries,
            Ok(None) => {
                debug!("History slot {:?} is empty", HISTORY_SLOT);
                Vec::new()
            }
            Err(e) => {
                warn!("Ignoring unreadable history in slot {:?}: {}", HISTORY_SLOT, e);
                Vec::new()
            }
        }
    }

    fn read_slot(&self) -> Result<Option<Vec<HistoryEntry>>, StorageError> {
        let Some(raw) = self.store.get(HISTORY_SLOT)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&raw)?))
    }
}
