//! Session and per-module run state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ScanConfig;
use crate::core::modules::{ModuleKind, ModuleResult};

/// Overall state of a scan session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Running => write!(f, "Running"),
            SessionState::Completed => write!(f, "Completed"),
            SessionState::Cancelled => write!(f, "Cancelled"),
            SessionState::Failed => write!(f, "Failed"),
        }
    }
}

/// State of one module within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ModuleRunState {
    Pending,
    Running { percent: f64, message: String },
    Completed { result: ModuleResult },
    Errored { message: String },
    Cancelled,
}

impl ModuleRunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Errored { .. } | Self::Cancelled
        )
    }

    /// Move to `next` if the transition is allowed.
    ///
    /// Allowed: Pending -> Running, Pending -> Cancelled (never started),
    /// Running -> Running (progress), Running -> any terminal state.
    /// Nothing leaves a terminal state.
    pub fn advance(&mut self, next: ModuleRunState) -> bool {
        let allowed = match (&*self, &next) {
            (Self::Pending, Self::Running { .. }) => true,
            (Self::Pending, Self::Cancelled) => true,
            (Self::Running { .. }, _) => !matches!(next, Self::Pending),
            _ => false,
        };
        if allowed {
            *self = next;
        }
        allowed
    }
}

/// One module's slot in a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRun {
    pub module: ModuleKind,
    pub state: ModuleRunState,
}

/// A single run of the orchestrator against one configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSession {
    pub id: String,
    pub config: ScanConfig,
    /// Enabled modules, in execution order
    pub modules: Vec<ModuleRun>,
    pub state: SessionState,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ScanSession {
    pub fn new(id: String, config: ScanConfig) -> Self {
        let modules = config
            .enabled_modules()
            .into_iter()
            .map(|module| ModuleRun {
                module,
                state: ModuleRunState::Pending,
            })
            .collect();
        Self {
            id,
            config,
            modules,
            state: SessionState::Idle,
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn module_state(&self, kind: ModuleKind) -> Option<&ModuleRunState> {
        self.modules.iter().find(|m| m.module == kind).map(|m| &m.state)
    }

    /// Mark every module that has not finished as cancelled
    pub fn cancel_unfinished(&mut self) {
        for run in &mut self.modules {
            if !run.state.is_terminal() {
                run.state = ModuleRunState::Cancelled;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn running() -> ModuleRunState {
        ModuleRunState::Running {
            percent: 10.0,
            message: "working".to_string(),
        }
    }

    #[test]
    fn pending_runs_then_finishes() {
        let mut state = ModuleRunState::Pending;
        assert!(state.advance(running()));
        assert!(state.advance(running()));
        assert!(state.advance(ModuleRunState::Errored {
            message: "boom".to_string()
        }));
        assert!(state.is_terminal());
    }

    #[test]
    fn terminal_states_are_final() {
        let mut state = ModuleRunState::Pending;
        state.advance(running());
        state.advance(ModuleRunState::Cancelled);

        assert!(!state.advance(running()));
        assert!(!state.advance(ModuleRunState::Errored {
            message: "late".to_string()
        }));
        assert_eq!(state, ModuleRunState::Cancelled);
    }

    #[test]
    fn pending_cannot_skip_to_result() {
        let mut state = ModuleRunState::Pending;
        assert!(!state.advance(ModuleRunState::Errored {
            message: "x".to_string()
        }));
        assert!(state.advance(ModuleRunState::Cancelled));
    }

    #[test]
    fn session_lists_modules_in_order() {
        let config = ScanConfig::new(
            vec![PathBuf::from("/photos")],
            [ModuleKind::Screenshots, ModuleKind::Duplicates],
        );
        let mut session = ScanSession::new("s".to_string(), config);

        let kinds: Vec<_> = session.modules.iter().map(|m| m.module).collect();
        assert_eq!(kinds, vec![ModuleKind::Duplicates, ModuleKind::Screenshots]);
        assert_eq!(session.state, SessionState::Idle);

        session.cancel_unfinished();
        assert_eq!(
            session.module_state(ModuleKind::Screenshots),
            Some(&ModuleRunState::Cancelled)
        );
    }
}
