//! # Core Module
//!
//! The GUI-agnostic scan orchestration engine.
//!
//! ## Modules
//! - `modules` - Module kinds, settings, results and the collaborator contract
//! - `builtin` - Filesystem-only module implementations
//! - `cancel` - Cooperative cancellation tokens
//! - `progress` - Per-module progress sinks and session-wide aggregation
//! - `runner` - Runs one module and turns every outcome into a value
//! - `session` - The session state machine
//! - `aggregate` - Combines module results into one report
//! - `history` - Persists one entry per module run

pub mod aggregate;
pub mod builtin;
pub mod cancel;
pub mod history;
pub mod modules;
pub mod progress;
pub mod runner;
pub mod session;

// Re-export commonly used types
pub use aggregate::{AggregateResult, ModuleReport, ModuleStatus};
pub use cancel::CancellationToken;
pub use history::{HistoryEntry, HistoryStore, InMemoryHistory, ScanStatus, SqliteHistory};
pub use modules::{ModuleCollaborator, ModuleConfig, ModuleKind, ModuleRegistry, ModuleResult};
pub use progress::{AggregateProgress, ProgressSink};
pub use session::{ScanConfig, SessionController, SessionState};
