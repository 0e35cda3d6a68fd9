//! # Session Module
//!
//! The top-level state machine: `Idle -> Running -> {Completed, Cancelled, Failed}`.
//!
//! ## Rules
//! - Only one session runs at a time; a second `start_session` is `Busy`
//! - Enabled modules run one after another in fixed order
//! - A failing module is recorded and skipped, never fatal
//! - Cancellation is checked between modules and passed into each one
//! - Losing the history store fails the session immediately

mod config;
mod controller;
mod types;

pub use config::{ScanConfig, ScanConfigBuilder};
pub use controller::SessionController;
pub use types::{ModuleRun, ModuleRunState, ScanSession, SessionState};
