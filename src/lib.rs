//! # Scan Orchestrator
//!
//! Runs a user-selected set of photo-library analysis modules as one scan
//! session, with unified progress, cooperative cancellation and a
//! persistent per-module scan history.
//!
//! ## Guarantees
//! - **One session at a time** - a second start is rejected, not queued
//! - **Module faults stay local** - an erroring module never aborts the session
//! - **Monotonic progress** - overall percent never goes backwards
//!
//! ## Architecture
//! - `core` - Session controller, module runner, aggregation and history
//! - `events` - Event-driven progress reporting (GUI-ready)
//! - `error` - User-friendly error types

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{OrchestratorError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point (CLI or GUI).
/// Does nothing if a global subscriber is already installed.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
