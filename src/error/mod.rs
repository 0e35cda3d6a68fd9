//! # Error Module
//!
//! Error types for the scan orchestrator.
//!
//! ## Design Principles
//! - **Module faults stay local** - a failing module never fails the session
//! - **Include context** - paths, module names, session ids
//! - **User-friendly messages** - shown as-is in the CLI and history

use std::path::PathBuf;
use thiserror::Error;

use crate::core::modules::ModuleKind;

/// Top-level orchestrator error
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("A scan session is already running ({active})")]
    Busy { active: String },

    #[error("No scan session with id {id}")]
    SessionNotFound { id: String },

    #[error("Scan session {session} failed: {reason}")]
    Failed { session: String, reason: String },

    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

/// Invalid scan configuration, rejected before any module starts
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No folders selected to scan")]
    NoPaths,

    #[error("No scan modules enabled")]
    NoModules,

    #[error("Folder not found: {path}")]
    PathNotFound { path: PathBuf },

    #[error("Not a folder: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Cannot read folder {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The {module} module is not available in this build")]
    ModuleUnavailable { module: ModuleKind },

    #[error("Invalid {module} setting: {reason}")]
    InvalidSetting { module: ModuleKind, reason: String },

    #[error("Failed to load settings from {path}: {reason}")]
    SettingsFile { path: PathBuf, reason: String },
}

/// A single module run failed. Never escalates to the session.
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("{0}")]
    Failed(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Module was cancelled")]
    Cancelled,

    #[error("Module crashed: {0}")]
    Panicked(String),

    #[error("Module timed out after {after_ms} ms")]
    TimedOut { after_ms: u64 },
}

/// Errors from the scan history store
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to open history database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("History query failed: {0}")]
    QueryFailed(String),

    #[error("History entry {id} already exists")]
    DuplicateId { id: String },

    #[error("Failed to serialize history data: {0}")]
    SerializationFailed(String),

    #[error("History store unavailable: {0}")]
    Unavailable(String),
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrchestratorError>;
