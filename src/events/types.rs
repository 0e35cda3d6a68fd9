//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::modules::{ModuleKind, ModuleSummary};
use crate::core::progress::{AggregateProgress, ModuleProgress};
use crate::core::session::SessionState;

/// All events emitted by the session controller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Session lifecycle
    Session(SessionEvent),
    /// Individual module lifecycle and raw progress
    Module(ModuleEvent),
    /// Recomputed session-wide progress
    Progress(AggregateProgress),
}

/// Session lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Session has started
    Started {
        session_id: String,
        modules: Vec<ModuleKind>,
        paths: Vec<PathBuf>,
    },
    /// Session reached a terminal state
    Finished {
        session_id: String,
        state: SessionState,
        duration_ms: u64,
    },
}

/// Module lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModuleEvent {
    /// Module was invoked
    Started { module: ModuleKind },
    /// Raw progress, exactly as the module reported it
    Progress(ModuleProgress),
    /// Module produced a result
    Completed {
        module: ModuleKind,
        summary: ModuleSummary,
    },
    /// Module failed; the session continues
    Errored { module: ModuleKind, message: String },
    /// Module stopped or never started because of cancellation
    Cancelled { module: ModuleKind },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Progress(AggregateProgress {
            current_module: Some(ModuleKind::LargeFiles),
            modules_completed: vec![ModuleKind::Duplicates],
            modules_pending: vec![],
            overall_percent: 75,
            current_module_percent: 50.0,
            message: "Walking".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Progress(p) => {
                assert_eq!(p.overall_percent, 75);
                assert_eq!(p.current_module, Some(ModuleKind::LargeFiles));
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn finished_event_carries_state() {
        let event = Event::Session(SessionEvent::Finished {
            session_id: "abc".to_string(),
            state: SessionState::Cancelled,
            duration_ms: 5000,
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("cancelled"));
        assert!(json.contains("5000"));
    }
}
