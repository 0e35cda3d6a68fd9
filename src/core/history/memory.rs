//! In-memory history store.

use std::cmp::Reverse;
use std::sync::RwLock;

use super::store::generate_id;
use super::{HistoryEntry, HistoryPage, HistoryStore};
use crate::error::HistoryError;

/// In-memory history store
///
/// Useful for testing and for runs that should leave no trace on disk.
#[derive(Debug, Default)]
pub struct InMemoryHistory {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> HistoryError {
    HistoryError::Unavailable("history lock poisoned".to_string())
}

impl HistoryStore for InMemoryHistory {
    fn append(&self, mut entry: HistoryEntry) -> Result<String, HistoryError> {
        let mut entries = self.entries.write().map_err(poisoned)?;

        if entry.id.is_empty() {
            entry.id = generate_id();
        } else if entries.iter().any(|e| e.id == entry.id) {
            return Err(HistoryError::DuplicateId { id: entry.id });
        }

        let id = entry.id.clone();
        entries.push(entry);
        Ok(id)
    }

    fn list(&self, limit: usize, offset: usize) -> Result<HistoryPage, HistoryError> {
        let entries = self.entries.read().map_err(poisoned)?;

        let mut ordered: Vec<&HistoryEntry> = entries.iter().collect();
        ordered.sort_by_key(|e| Reverse((e.scan_time, e.id.clone())));

        Ok(HistoryPage {
            entries: ordered
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
            total_count: entries.len(),
        })
    }

    fn get(&self, id: &str) -> Result<Option<HistoryEntry>, HistoryError> {
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.iter().find(|e| e.id == id).cloned())
    }

    fn delete(&self, id: &str) -> Result<bool, HistoryError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() < before)
    }

    fn clear(&self) -> Result<usize, HistoryError> {
        let mut entries = self.entries.write().map_err(poisoned)?;
        let count = entries.len();
        entries.clear();
        Ok(count)
    }
}
