//! Progress sink handed to module collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::modules::ModuleKind;

/// One raw progress report from a running module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleProgress {
    pub module: ModuleKind,
    /// Module-defined phase name ("walking", "hashing", ...)
    pub phase: String,
    /// 0-100
    pub percent: f64,
    pub message: String,
}

type ProgressCallback = Arc<dyn Fn(ModuleProgress) + Send + Sync>;

/// Receives progress from one module run.
///
/// Reports are forwarded synchronously to the callback on the caller's
/// thread. Once detached (after a timeout), further reports are dropped.
#[derive(Clone)]
pub struct ProgressSink {
    module: ModuleKind,
    callback: ProgressCallback,
    detached: Arc<AtomicBool>,
}

impl ProgressSink {
    pub fn new<F>(module: ModuleKind, callback: F) -> Self
    where
        F: Fn(ModuleProgress) + Send + Sync + 'static,
    {
        Self {
            module,
            callback: Arc::new(callback),
            detached: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A sink that discards everything
    pub fn null(module: ModuleKind) -> Self {
        Self::new(module, |_| {})
    }

    pub fn module(&self) -> ModuleKind {
        self.module
    }

    /// Report progress. `percent` is clamped to 0-100.
    pub fn report(&self, phase: &str, percent: f64, message: impl Into<String>) {
        if self.detached.load(Ordering::SeqCst) {
            return;
        }
        let percent = if percent.is_nan() {
            0.0
        } else {
            percent.clamp(0.0, 100.0)
        };
        (self.callback)(ModuleProgress {
            module: self.module,
            phase: phase.to_string(),
            percent,
            message: message.into(),
        });
    }

    /// Report `done` out of `total` units of work
    pub fn report_fraction(&self, phase: &str, done: usize, total: usize, message: impl Into<String>) {
        let percent = if total == 0 {
            100.0
        } else {
            done as f64 / total as f64 * 100.0
        };
        self.report(phase, percent, message);
    }

    /// A sink for one stage of a multi-stage module.
    ///
    /// Reports of 0-100 on the returned sink land in `from..=to` on this one.
    pub fn stage(&self, from: f64, to: f64) -> ProgressSink {
        let outer = self.clone();
        ProgressSink::new(self.module, move |p| {
            outer.report(&p.phase, from + (to - from) * p.percent / 100.0, p.message);
        })
    }

    /// Stop forwarding reports
    pub fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }
}

impl fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressSink")
            .field("module", &self.module)
            .field("detached", &self.detached.load(Ordering::SeqCst))
            .finish()
    }
}
