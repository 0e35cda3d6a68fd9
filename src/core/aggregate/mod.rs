//! # Result Aggregation
//!
//! Folds the terminal state of every module into one [`AggregateResult`].
//! Only completed modules contribute to the totals; errored and cancelled
//! modules are listed with their status and no result.

use serde::{Deserialize, Serialize};

use crate::core::modules::{descriptor, ModuleKind, ModuleResult, ModuleSummary};
use crate::core::session::{ModuleRunState, SessionState};

/// How a module ended, without its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModuleStatus {
    /// Never started
    Pending,
    Completed,
    Errored { message: String },
    Cancelled,
}

/// One module's contribution to the aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleReport {
    pub module: ModuleKind,
    pub status: ModuleStatus,
    pub result: Option<ModuleResult>,
    pub summary: Option<ModuleSummary>,
}

/// The combined report of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub session_id: String,
    pub state: SessionState,
    /// Enabled modules, in execution order
    pub modules: Vec<ModuleReport>,
    pub total_items_found: usize,
    pub total_savings_bytes: u64,
    pub duration_ms: u64,
}

impl AggregateResult {
    /// The typed result of a module, if it completed
    pub fn result(&self, kind: ModuleKind) -> Option<&ModuleResult> {
        self.report(kind).and_then(|r| r.result.as_ref())
    }

    pub fn report(&self, kind: ModuleKind) -> Option<&ModuleReport> {
        self.modules.iter().find(|r| r.module == kind)
    }

    pub fn completed_count(&self) -> usize {
        self.modules
            .iter()
            .filter(|r| r.status == ModuleStatus::Completed)
            .count()
    }
}

/// Builds an [`AggregateResult`] module by module
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    session_id: String,
    modules: Vec<ModuleReport>,
}

impl ResultAggregator {
    pub fn new(session_id: impl Into<String>, order: &[ModuleKind]) -> Self {
        Self {
            session_id: session_id.into(),
            modules: order
                .iter()
                .map(|&module| ModuleReport {
                    module,
                    status: ModuleStatus::Pending,
                    result: None,
                    summary: None,
                })
                .collect(),
        }
    }

    /// Record a module's terminal state. Non-terminal states are ignored.
    pub fn fold(&mut self, kind: ModuleKind, state: &ModuleRunState) {
        let Some(report) = self.modules.iter_mut().find(|r| r.module == kind) else {
            return;
        };

        match state {
            ModuleRunState::Completed { result } => {
                report.status = ModuleStatus::Completed;
                report.summary = descriptor(kind).summary(result);
                report.result = Some(result.clone());
            }
            ModuleRunState::Errored { message } => {
                report.status = ModuleStatus::Errored {
                    message: message.clone(),
                };
            }
            ModuleRunState::Cancelled => report.status = ModuleStatus::Cancelled,
            ModuleRunState::Pending | ModuleRunState::Running { .. } => {}
        }
    }

    /// Mark every module that never started as cancelled
    pub fn cancel_pending(&mut self) {
        for report in &mut self.modules {
            if report.status == ModuleStatus::Pending {
                report.status = ModuleStatus::Cancelled;
            }
        }
    }

    pub fn finish(self, state: SessionState, duration_ms: u64) -> AggregateResult {
        let completed = self
            .modules
            .iter()
            .filter(|r| r.status == ModuleStatus::Completed)
            .filter_map(|r| r.summary);

        let (total_items_found, total_savings_bytes) = completed
            .fold((0usize, 0u64), |(items, bytes), s| {
                (items + s.items_found, bytes + s.savings_bytes)
            });

        AggregateResult {
            session_id: self.session_id,
            state,
            modules: self.modules,
            total_items_found,
            total_savings_bytes,
            duration_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::modules::{LargeFileInfo, LargeFilesResult};

    fn large_files(count: usize, size: u64) -> ModuleResult {
        ModuleResult::LargeFiles(LargeFilesResult {
            files: (0..count)
                .map(|i| LargeFileInfo {
                    path: format!("/lib/{}.mov", i),
                    filename: format!("{}.mov", i),
                    size_bytes: size,
                    file_type: "mov".to_string(),
                    modified: 0,
                })
                .collect(),
            total_size_bytes: size * count as u64,
            files_scanned: count * 2,
            duration_ms: 3,
        })
    }

    #[test]
    fn totals_sum_completed_modules_only() {
        let mut agg = ResultAggregator::new(
            "s",
            &[ModuleKind::Duplicates, ModuleKind::LargeFiles, ModuleKind::Unorganized],
        );
        agg.fold(
            ModuleKind::Duplicates,
            &ModuleRunState::Errored {
                message: "boom".to_string(),
            },
        );
        agg.fold(
            ModuleKind::LargeFiles,
            &ModuleRunState::Completed {
                result: large_files(4, 100),
            },
        );
        agg.fold(ModuleKind::Unorganized, &ModuleRunState::Cancelled);

        let result = agg.finish(SessionState::Cancelled, 12);
        assert_eq!(result.total_items_found, 4);
        assert_eq!(result.total_savings_bytes, 400);
        assert_eq!(result.duration_ms, 12);
        assert_eq!(result.completed_count(), 1);
        assert!(result.result(ModuleKind::Duplicates).is_none());
        assert!(result.result(ModuleKind::LargeFiles).is_some());
        assert_eq!(
            result.report(ModuleKind::Unorganized).map(|r| &r.status),
            Some(&ModuleStatus::Cancelled)
        );
    }

    #[test]
    fn unfinished_modules_stay_pending() {
        let mut agg = ResultAggregator::new("s", &[ModuleKind::Screenshots]);
        agg.fold(
            ModuleKind::Screenshots,
            &ModuleRunState::Running {
                percent: 50.0,
                message: String::new(),
            },
        );
        let result = agg.finish(SessionState::Failed, 0);
        assert_eq!(result.modules[0].status, ModuleStatus::Pending);
        assert_eq!(result.total_items_found, 0);
    }

    #[test]
    fn cancel_pending_keeps_finished_outcomes() {
        let mut agg = ResultAggregator::new("s", &[ModuleKind::Duplicates, ModuleKind::LargeFiles]);
        agg.fold(
            ModuleKind::Duplicates,
            &ModuleRunState::Errored {
                message: "boom".to_string(),
            },
        );
        agg.cancel_pending();

        let result = agg.finish(SessionState::Cancelled, 0);
        assert!(matches!(result.modules[0].status, ModuleStatus::Errored { .. }));
        assert_eq!(result.modules[1].status, ModuleStatus::Cancelled);
    }

    #[test]
    fn modules_not_in_session_are_ignored() {
        let mut agg = ResultAggregator::new("s", &[ModuleKind::Duplicates]);
        agg.fold(
            ModuleKind::LargeFiles,
            &ModuleRunState::Completed {
                result: large_files(1, 1),
            },
        );
        let result = agg.finish(SessionState::Completed, 0);
        assert_eq!(result.total_items_found, 0);
        assert_eq!(result.modules.len(), 1);
    }
}
