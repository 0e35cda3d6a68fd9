//! # Scan History Module
//!
//! Stores and retrieves one record per module run for browsing past scans.
//!
//! ## Features
//! - Persistent storage using SQLite, or in-memory for tests
//! - Pagination, newest first
//! - Delete and clear operations

mod memory;
mod sqlite;
mod store;
mod types;

pub use memory::InMemoryHistory;
pub use sqlite::SqliteHistory;
pub use store::{generate_id, HistoryStore};
pub use types::{HistoryEntry, HistoryPage, ScanStatus};
