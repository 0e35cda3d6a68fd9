//! # Module Runner
//!
//! Runs one module collaborator and turns whatever happens into a
//! [`ModuleOutcome`]. Failures, panics and timeouts become `Errored`; they
//! never reach the session.

use crossbeam_channel::{bounded, RecvTimeoutError};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::core::cancel::CancellationToken;
use crate::core::modules::{
    ModuleCollaborator, ModuleConfig, ModuleDescriptor, ModuleRegistry, ModuleResult,
};
use crate::core::progress::ProgressSink;
use crate::error::ModuleError;

/// How a single module run ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ModuleOutcome {
    Completed { result: ModuleResult },
    Errored { message: String },
    Cancelled,
}

impl ModuleOutcome {
    fn from_execution(
        descriptor: &ModuleDescriptor,
        execution: Result<ModuleResult, ModuleError>,
    ) -> Self {
        match execution {
            Ok(result) if descriptor.summary(&result).is_some() => Self::Completed { result },
            Ok(result) => Self::Errored {
                message: format!(
                    "{} module returned a {} result",
                    descriptor.kind,
                    result.kind()
                ),
            },
            Err(ModuleError::Cancelled) => Self::Cancelled,
            Err(e) => Self::Errored {
                message: e.to_string(),
            },
        }
    }
}

/// Invokes collaborators from a registry
#[derive(Debug, Clone, Default)]
pub struct ModuleRunner {
    registry: ModuleRegistry,
    deadline: Option<Duration>,
}

impl ModuleRunner {
    pub fn new(registry: ModuleRegistry) -> Self {
        Self {
            registry,
            deadline: None,
        }
    }

    /// Treat a module still running after `deadline` as errored
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Run one module.
    ///
    /// Returns `Cancelled` without invoking the module if `cancel` is
    /// already set. Progress is forwarded verbatim to `sink`.
    pub fn run(
        &self,
        descriptor: &ModuleDescriptor,
        config: ModuleConfig,
        sink: ProgressSink,
        cancel: &CancellationToken,
    ) -> ModuleOutcome {
        if cancel.is_cancelled() {
            debug!(module = %descriptor.kind, "Skipping module, session cancelled");
            return ModuleOutcome::Cancelled;
        }

        let Some(collaborator) = self.registry.get(descriptor.kind) else {
            return ModuleOutcome::Errored {
                message: format!("The {} module is not available", descriptor.kind),
            };
        };

        let execution = match self.deadline {
            None => invoke(collaborator.as_ref(), &config, &sink, cancel),
            Some(deadline) => invoke_with_deadline(collaborator, config, sink, cancel, deadline),
        };

        let outcome = ModuleOutcome::from_execution(descriptor, execution);
        if let ModuleOutcome::Errored { message } = &outcome {
            warn!(module = %descriptor.kind, error = %message, "Module failed");
        }
        outcome
    }
}

fn invoke(
    collaborator: &dyn ModuleCollaborator,
    config: &ModuleConfig,
    sink: &ProgressSink,
    cancel: &CancellationToken,
) -> Result<ModuleResult, ModuleError> {
    panic::catch_unwind(AssertUnwindSafe(|| collaborator.execute(config, sink, cancel)))
        .unwrap_or_else(|payload| Err(ModuleError::Panicked(panic_message(payload.as_ref()))))
}

/// Runs the collaborator on its own thread and stops waiting at `deadline`.
///
/// A module that overruns keeps its thread until it returns, but its
/// progress is detached and its own cancellation token is set.
fn invoke_with_deadline(
    collaborator: Arc<dyn ModuleCollaborator>,
    config: ModuleConfig,
    sink: ProgressSink,
    cancel: &CancellationToken,
    deadline: Duration,
) -> Result<ModuleResult, ModuleError> {
    let (tx, rx) = bounded(1);
    let module_token = cancel.child();
    let worker_token = module_token.clone();
    let worker_sink = sink.clone();

    let spawned = thread::Builder::new()
        .name(format!("module-{}", collaborator.kind().as_str()))
        .spawn(move || {
            let _ = tx.send(invoke(
                collaborator.as_ref(),
                &config,
                &worker_sink,
                &worker_token,
            ));
        });

    if let Err(e) = spawned {
        return Err(ModuleError::Failed(format!("Failed to start module thread: {}", e)));
    }

    match rx.recv_timeout(deadline) {
        Ok(execution) => execution,
        Err(RecvTimeoutError::Timeout) => {
            sink.detach();
            module_token.cancel();
            Err(ModuleError::TimedOut {
                after_ms: deadline.as_millis() as u64,
            })
        }
        Err(RecvTimeoutError::Disconnected) => {
            Err(ModuleError::Panicked("module thread exited without a result".to_string()))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
