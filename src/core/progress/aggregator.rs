//! Folds per-module progress into one session-wide snapshot.

use serde::{Deserialize, Serialize};

use super::ModuleProgress;
use crate::core::modules::ModuleKind;
use crate::core::session::SessionState;

/// Session-wide progress, recomputed on every module event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateProgress {
    pub current_module: Option<ModuleKind>,
    pub modules_completed: Vec<ModuleKind>,
    pub modules_pending: Vec<ModuleKind>,
    /// 0-100, never decreases within a session
    pub overall_percent: u8,
    pub current_module_percent: f64,
    pub message: String,
}

/// `floor((index + percent / 100) / total * 100)`, in integer hundredths
/// so that module boundaries land on exact values.
pub fn overall_percent(index: usize, percent: f64, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let hundredths = (percent.clamp(0.0, 100.0) * 100.0).round() as u64;
    let scaled = (index as u64 * 10_000 + hundredths) / (total as u64 * 100);
    scaled.min(100) as u8
}

/// Tracks a sequential session's progress.
///
/// Modules are partitioned around `index`: everything before it has reached
/// a terminal state, everything after it has not started.
#[derive(Debug, Clone)]
pub struct ProgressAggregator {
    order: Vec<ModuleKind>,
    index: usize,
    running: bool,
    module_percent: f64,
    overall: u8,
    message: String,
    finished: bool,
}

impl ProgressAggregator {
    pub fn new(order: Vec<ModuleKind>) -> Self {
        Self {
            order,
            index: 0,
            running: false,
            module_percent: 0.0,
            overall: 0,
            message: "Waiting to start".to_string(),
            finished: false,
        }
    }

    /// The module at `index` has started
    pub fn module_started(&mut self, index: usize) -> AggregateProgress {
        if !self.finished && index < self.order.len() {
            self.index = index;
            self.running = true;
            self.module_percent = 0.0;
            self.message = format!("Running {}", self.order[index]);
            self.bump(overall_percent(index, 0.0, self.order.len()));
        }
        self.snapshot()
    }

    /// A raw event from the running module.
    ///
    /// Events from a module other than the current one are ignored, and a
    /// module's percent never moves backwards.
    pub fn module_progress(&mut self, event: &ModuleProgress) -> AggregateProgress {
        if self.running && !self.finished && self.order.get(self.index) == Some(&event.module) {
            self.module_percent = self.module_percent.max(event.percent.clamp(0.0, 100.0));
            self.message = event.message.clone();
            self.bump(overall_percent(self.index, self.module_percent, self.order.len()));
        }
        self.snapshot()
    }

    /// The running module reached a terminal state
    pub fn module_finished(&mut self) -> AggregateProgress {
        if self.running && !self.finished {
            self.running = false;
            self.index += 1;
            self.module_percent = 0.0;
            self.bump(overall_percent(self.index, 0.0, self.order.len()));
        }
        self.snapshot()
    }

    /// The session reached a terminal state.
    ///
    /// Completed pins overall progress to 100; Cancelled and Failed keep
    /// the last value.
    pub fn finish(&mut self, state: SessionState, message: impl Into<String>) -> AggregateProgress {
        if !self.finished {
            if state == SessionState::Completed {
                self.index = self.order.len();
                self.overall = 100;
            }
            self.running = false;
            self.finished = true;
            self.message = message.into();
        }
        self.snapshot()
    }

    pub fn snapshot(&self) -> AggregateProgress {
        let split = self.index.min(self.order.len());
        let pending_from = if self.running { split + 1 } else { split };
        AggregateProgress {
            current_module: if self.running {
                self.order.get(split).copied()
            } else {
                None
            },
            modules_completed: self.order[..split].to_vec(),
            modules_pending: self.order[pending_from.min(self.order.len())..].to_vec(),
            overall_percent: self.overall,
            current_module_percent: self.module_percent,
            message: self.message.clone(),
        }
    }

    /// Only a completed session reaches 100
    fn bump(&mut self, value: u8) {
        self.overall = self.overall.max(value.min(99));
    }
}
