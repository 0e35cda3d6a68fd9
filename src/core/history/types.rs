//! Types for scan history storage.

use serde::{Deserialize, Serialize};

use crate::core::modules::ModuleKind;

/// Status of a recorded module run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Completed,
    Cancelled,
    Error(String),
}

impl ScanStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Error(_) => "error",
        }
    }

    pub fn from_parts(s: &str, error_msg: Option<&str>) -> Self {
        match s {
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            "error" => Self::Error(error_msg.unwrap_or("Unknown error").to_string()),
            _ => Self::Error(format!("Unknown status: {}", s)),
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// A scan history entry, one per module run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Empty until the store assigns one
    pub id: String,
    /// Session that produced this entry
    pub session_id: Option<String>,
    pub module_type: ModuleKind,
    /// Unix timestamp in seconds
    pub scan_time: i64,
    pub paths: Vec<String>,
    /// JSON-serialized module settings
    pub settings: String,
    pub total_files: usize,
    pub groups_found: Option<usize>,
    pub duplicates_found: Option<usize>,
    pub potential_savings: Option<u64>,
    pub duration_ms: u64,
    pub status: ScanStatus,
}

impl HistoryEntry {
    /// An entry with no counts, for a module that produced no result
    pub fn without_result(
        module_type: ModuleKind,
        scan_time: i64,
        paths: Vec<String>,
        duration_ms: u64,
        status: ScanStatus,
    ) -> Self {
        Self {
            id: String::new(),
            session_id: None,
            module_type,
            scan_time,
            paths,
            settings: "{}".to_string(),
            total_files: 0,
            groups_found: None,
            duplicates_found: None,
            potential_savings: None,
            duration_ms,
            status,
        }
    }
}

/// One page of scan history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage {
    /// Newest first
    pub entries: Vec<HistoryEntry>,
    /// Entries in the whole store, not just this page
    pub total_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_status_storage_form() {
        assert_eq!(ScanStatus::Completed.as_str(), "completed");
        assert_eq!(ScanStatus::Error("boom".to_string()).as_str(), "error");
        assert_eq!(
            ScanStatus::from_parts("error", Some("boom")),
            ScanStatus::Error("boom".to_string())
        );
        assert_eq!(ScanStatus::from_parts("cancelled", None), ScanStatus::Cancelled);
    }

    #[test]
    fn test_unknown_status_is_error() {
        let status = ScanStatus::from_parts("exploded", None);
        assert_eq!(status.error_message(), Some("Unknown status: exploded"));
    }
}
