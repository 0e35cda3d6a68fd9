//! The history store contract.

use uuid::Uuid;

use super::{HistoryEntry, HistoryPage};
use crate::error::HistoryError;

/// Durable log of module runs.
///
/// Entries are immutable once written; the only mutations are append,
/// delete and clear. Listing is ordered by `scan_time` descending, ties
/// broken by id descending.
pub trait HistoryStore: Send + Sync {
    /// Store an entry, assigning a fresh id when `entry.id` is empty.
    ///
    /// Never overwrites: an existing id is `HistoryError::DuplicateId`.
    fn append(&self, entry: HistoryEntry) -> Result<String, HistoryError>;

    /// One page of entries plus the total number stored
    fn list(&self, limit: usize, offset: usize) -> Result<HistoryPage, HistoryError>;

    /// Get a specific entry by id
    fn get(&self, id: &str) -> Result<Option<HistoryEntry>, HistoryError>;

    /// Remove an entry. Returns whether anything was removed.
    fn delete(&self, id: &str) -> Result<bool, HistoryError>;

    /// Remove every entry, returning how many there were
    fn clear(&self) -> Result<usize, HistoryError>;
}

/// Generate a new unique, time-ordered id
pub fn generate_id() -> String {
    Uuid::now_v7().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_sort_in_creation_order() {
        let ids: Vec<String> = (0..50).map(|_| generate_id()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
