//! SQLite-backed history store.

use rusqlite::{params, Connection, ErrorCode, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use super::store::generate_id;
use super::{HistoryEntry, HistoryPage, HistoryStore, ScanStatus};
use crate::core::modules::ModuleKind;
use crate::error::HistoryError;

const SELECT_COLUMNS: &str = "SELECT id, session_id, module_type, scan_time, paths, settings,
        total_files, groups_found, duplicates_found, potential_savings,
        duration_ms, status, error_message
 FROM scan_history";

/// Persistent history in a single SQLite file
pub struct SqliteHistory {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl SqliteHistory {
    /// Open or create the history database
    pub fn open(path: &Path) -> Result<Self, HistoryError> {
        let open_failed = |reason: String| HistoryError::OpenFailed {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| open_failed(e.to_string()))?;
        }

        let conn = Connection::open(path).map_err(|e| open_failed(e.to_string()))?;

        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| open_failed(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS scan_history (
                id TEXT PRIMARY KEY,
                session_id TEXT,
                module_type TEXT NOT NULL,
                scan_time INTEGER NOT NULL,
                paths TEXT NOT NULL,
                settings TEXT NOT NULL,
                total_files INTEGER NOT NULL,
                groups_found INTEGER,
                duplicates_found INTEGER,
                potential_savings INTEGER,
                duration_ms INTEGER NOT NULL,
                status TEXT NOT NULL,
                error_message TEXT
            )",
            [],
        )
        .map_err(|e| open_failed(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_scan_history_time ON scan_history(scan_time DESC, id DESC)",
            [],
        )
        .map_err(|e| open_failed(e.to_string()))?;

        debug!(path = %path.display(), "Opened history database");

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        })
    }

    /// Path of the backing database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, HistoryError> {
        self.conn
            .lock()
            .map_err(|_| HistoryError::Unavailable("history connection poisoned".to_string()))
    }
}

fn query_failed(e: rusqlite::Error) -> HistoryError {
    HistoryError::QueryFailed(e.to_string())
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<HistoryEntry> {
    let module_type: String = row.get(2)?;
    let paths_json: String = row.get(4)?;
    let status: String = row.get(11)?;
    let error_message: Option<String> = row.get(12)?;

    Ok(HistoryEntry {
        id: row.get(0)?,
        session_id: row.get(1)?,
        module_type: module_type.parse().unwrap_or_else(|_| {
            warn!(module_type = %module_type, "Unknown module type in history row");
            ModuleKind::Duplicates
        }),
        scan_time: row.get(3)?,
        paths: serde_json::from_str(&paths_json).unwrap_or_default(),
        settings: row.get(5)?,
        total_files: row.get::<_, i64>(6)? as usize,
        groups_found: row.get::<_, Option<i64>>(7)?.map(|v| v as usize),
        duplicates_found: row.get::<_, Option<i64>>(8)?.map(|v| v as usize),
        potential_savings: row.get::<_, Option<i64>>(9)?.map(|v| v as u64),
        duration_ms: row.get::<_, i64>(10)? as u64,
        status: ScanStatus::from_parts(&status, error_message.as_deref()),
    })
}

/// SQLite takes signed counts and treats negative OFFSET as 0
fn to_sql_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn count(conn: &Connection) -> Result<usize, HistoryError> {
    conn.query_row("SELECT COUNT(*) FROM scan_history", [], |row| {
        row.get::<_, i64>(0).map(|v| v as usize)
    })
    .map_err(query_failed)
}

impl HistoryStore for SqliteHistory {
    fn append(&self, mut entry: HistoryEntry) -> Result<String, HistoryError> {
        if entry.id.is_empty() {
            entry.id = generate_id();
        }

        let paths_json = serde_json::to_string(&entry.paths)
            .map_err(|e| HistoryError::SerializationFailed(e.to_string()))?;

        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT INTO scan_history
             (id, session_id, module_type, scan_time, paths, settings, total_files,
              groups_found, duplicates_found, potential_savings, duration_ms, status, error_message)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.id,
                entry.session_id,
                entry.module_type.as_str(),
                entry.scan_time,
                paths_json,
                entry.settings,
                entry.total_files as i64,
                entry.groups_found.map(|v| v as i64),
                entry.duplicates_found.map(|v| v as i64),
                entry.potential_savings.map(|v| v as i64),
                entry.duration_ms as i64,
                entry.status.as_str(),
                entry.status.error_message(),
            ],
        );

        match inserted {
            Ok(_) => Ok(entry.id),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(HistoryError::DuplicateId { id: entry.id })
            }
            Err(e) => Err(query_failed(e)),
        }
    }

    fn list(&self, limit: usize, offset: usize) -> Result<HistoryPage, HistoryError> {
        let conn = self.lock()?;
        let total_count = count(&conn)?;

        let mut stmt = conn
            .prepare(&format!(
                "{} ORDER BY scan_time DESC, id DESC LIMIT ? OFFSET ?",
                SELECT_COLUMNS
            ))
            .map_err(query_failed)?;

        let entries = stmt
            .query_map(params![to_sql_count(limit), to_sql_count(offset)], row_to_entry)
            .map_err(query_failed)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(query_failed)?;

        Ok(HistoryPage {
            entries,
            total_count,
        })
    }

    fn get(&self, id: &str) -> Result<Option<HistoryEntry>, HistoryError> {
        let conn = self.lock()?;

        let result = conn.query_row(
            &format!("{} WHERE id = ?", SELECT_COLUMNS),
            [id],
            row_to_entry,
        );

        match result {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(query_failed(e)),
        }
    }

    fn delete(&self, id: &str) -> Result<bool, HistoryError> {
        let conn = self.lock()?;

        let rows_affected = conn
            .execute("DELETE FROM scan_history WHERE id = ?", [id])
            .map_err(query_failed)?;

        Ok(rows_affected > 0)
    }

    fn clear(&self) -> Result<usize, HistoryError> {
        let conn = self.lock()?;
        let removed = conn
            .execute("DELETE FROM scan_history", [])
            .map_err(query_failed)?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_entry(scan_time: i64) -> HistoryEntry {
        HistoryEntry {
            id: String::new(),
            session_id: Some("session-1".to_string()),
            module_type: ModuleKind::Duplicates,
            scan_time,
            paths: vec!["/test/path".to_string()],
            settings: "{}".to_string(),
            total_files: 100,
            groups_found: Some(5),
            duplicates_found: Some(10),
            potential_savings: Some(1024000),
            duration_ms: 1500,
            status: ScanStatus::Completed,
        }
    }

    fn open_temp() -> (TempDir, SqliteHistory) {
        let temp_dir = TempDir::new().unwrap();
        let repo = SqliteHistory::open(&temp_dir.path().join("history.db")).unwrap();
        (temp_dir, repo)
    }

    #[test]
    fn test_append_and_get_round_trip() {
        let (_dir, repo) = open_temp();
        let mut entry = create_test_entry(42);
        entry.status = ScanStatus::Error("disk on fire".to_string());

        let id = repo.append(entry.clone()).unwrap();
        let stored = repo.get(&id).unwrap().unwrap();

        entry.id = id;
        assert_eq!(stored, entry);
    }

    #[test]
    fn test_list_is_newest_first() {
        let (_dir, repo) = open_temp();
        for t in [1, 2, 3] {
            repo.append(create_test_entry(t)).unwrap();
        }

        let page = repo.list(2, 0).unwrap();
        let times: Vec<i64> = page.entries.iter().map(|e| e.scan_time).collect();
        assert_eq!(times, vec![3, 2]);
        assert_eq!(page.total_count, 3);
    }

    #[test]
    fn test_offset_past_end_is_empty() {
        let (_dir, repo) = open_temp();
        for t in [1, 2, 3] {
            repo.append(create_test_entry(t)).unwrap();
        }

        let page = repo.list(2, usize::MAX).unwrap();
        assert!(page.entries.is_empty());
        assert_eq!(page.total_count, 3);

        let all = repo.list(usize::MAX, 0).unwrap();
        assert_eq!(all.entries.len(), 3);
    }

    #[test]
    fn test_unknown_module_type_reads_back() {
        let (_dir, repo) = open_temp();
        let id = repo.append(create_test_entry(1)).unwrap();
        repo.lock()
            .unwrap()
            .execute(
                "UPDATE scan_history SET module_type = 'mystery' WHERE id = ?",
                [&id],
            )
            .unwrap();

        let stored = repo.get(&id).unwrap().unwrap();
        assert_eq!(stored.module_type, ModuleKind::Duplicates);
    }

    #[test]
    fn test_zero_limit() {
        let (_dir, repo) = open_temp();
        repo.append(create_test_entry(1)).unwrap();

        let page = repo.list(0, 0).unwrap();
        assert!(page.entries.is_empty());
        assert_eq!(page.total_count, 1);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let (_dir, repo) = open_temp();
        let id = repo.append(create_test_entry(1)).unwrap();

        let mut clash = create_test_entry(9);
        clash.id = id.clone();
        assert!(matches!(
            repo.append(clash),
            Err(HistoryError::DuplicateId { .. })
        ));
        assert_eq!(repo.get(&id).unwrap().unwrap().scan_time, 1);
    }

    #[test]
    fn test_delete_scan() {
        let (_dir, repo) = open_temp();
        let id = repo.append(create_test_entry(1)).unwrap();

        assert!(repo.delete(&id).unwrap());
        assert!(repo.get(&id).unwrap().is_none());
        assert!(!repo.delete(&id).unwrap());
    }

    #[test]
    fn test_clear_history() {
        let (_dir, repo) = open_temp();
        for t in 0..5 {
            repo.append(create_test_entry(t)).unwrap();
        }

        assert_eq!(repo.clear().unwrap(), 5);
        assert_eq!(repo.list(10, 0).unwrap().total_count, 0);
        assert_eq!(repo.clear().unwrap(), 0);
    }

    #[test]
    fn test_persists_across_opens() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("history.db");

        let id = {
            let repo = SqliteHistory::open(&path).unwrap();
            repo.append(create_test_entry(7)).unwrap()
        };

        let repo = SqliteHistory::open(&path).unwrap();
        assert_eq!(repo.path(), path.as_path());
        assert!(repo.get(&id).unwrap().is_some());
    }
}
