//! The session state machine.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Instant;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::{ModuleRunState, ScanConfig, ScanSession, SessionState};
use crate::core::aggregate::{AggregateResult, ResultAggregator};
use crate::core::cancel::{CancellationController, CancellationToken};
use crate::core::history::{HistoryEntry, HistoryPage, HistoryStore, ScanStatus};
use crate::core::modules::{descriptor, ModuleConfig, ModuleKind, ModuleRegistry};
use crate::core::progress::{AggregateProgress, ProgressAggregator, ProgressSink};
use crate::core::runner::{ModuleOutcome, ModuleRunner};
use crate::error::{ConfigError, OrchestratorError, Result};
use crate::events::{Event, EventBroadcaster, EventReceiver, EventSender, ModuleEvent, SessionEvent};

/// How a finished session is handed to `await_result`
#[derive(Debug, Clone)]
enum SessionOutcome {
    Finished(AggregateResult),
    Failed(String),
}

struct HandleState {
    session: ScanSession,
    progress: ProgressAggregator,
    outcome: Option<SessionOutcome>,
}

/// Shared between the controller and the session's worker thread
struct SessionHandle {
    id: String,
    state: Mutex<HandleState>,
    done: Condvar,
}

impl SessionHandle {
    fn lock(&self) -> MutexGuard<'_, HandleState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct Inner {
    runner: ModuleRunner,
    history: Arc<dyn HistoryStore>,
    cancellation: CancellationController,
    /// Id of the running session; `Some` means busy
    active: Mutex<Option<String>>,
    sessions: Mutex<HashMap<String, Arc<SessionHandle>>>,
    events: EventBroadcaster,
}

impl Inner {
    fn release_slot(&self, session_id: &str) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if active.as_deref() == Some(session_id) {
            *active = None;
        }
    }

    fn handle(&self, session_id: &str) -> Result<Arc<SessionHandle>> {
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| OrchestratorError::SessionNotFound {
                id: session_id.to_string(),
            })
    }
}

/// Runs scan sessions, one at a time.
///
/// Cloning is cheap; clones share the same busy slot, sessions and history.
#[derive(Clone)]
pub struct SessionController {
    inner: Arc<Inner>,
}

impl SessionController {
    pub fn new(registry: ModuleRegistry, history: Arc<dyn HistoryStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                runner: ModuleRunner::new(registry),
                history,
                cancellation: CancellationController::new(),
                active: Mutex::new(None),
                sessions: Mutex::new(HashMap::new()),
                events: EventBroadcaster::new(),
            }),
        }
    }

    /// Subscribe to events from every session
    pub fn subscribe(&self) -> EventReceiver {
        self.inner.events.subscribe()
    }

    /// Forward events from every session to an existing sender
    pub fn add_listener(&self, sender: EventSender) {
        self.inner.events.add(sender);
    }

    /// Whether a session is currently running
    pub fn is_running(&self) -> bool {
        self.active_session().is_some()
    }

    pub fn active_session(&self) -> Option<String> {
        self.inner
            .active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Validate `config` and start a session on a background thread.
    ///
    /// Fails with `Config` for an invalid configuration and `Busy` while
    /// another session runs; neither has side effects.
    ///
    /// The session stays queryable after it finishes, even once later
    /// sessions start, and is only released by `await_result`. Callers
    /// that start sessions must await each one or the controller keeps
    /// every finished session in memory.
    pub fn start_session(&self, mut config: ScanConfig) -> Result<String> {
        config.dedup_paths();
        config.validate()?;
        if let Some(&missing) = config
            .modules
            .iter()
            .find(|&&kind| !self.inner.runner.registry().contains(kind))
        {
            return Err(ConfigError::ModuleUnavailable { module: missing }.into());
        }

        let session_id = Uuid::new_v4().to_string();
        {
            let mut active = self.inner.active.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(running) = active.as_ref() {
                return Err(OrchestratorError::Busy {
                    active: running.clone(),
                });
            }
            *active = Some(session_id.clone());
        }

        let order = config.enabled_modules();
        let handle = Arc::new(SessionHandle {
            id: session_id.clone(),
            state: Mutex::new(HandleState {
                session: ScanSession::new(session_id.clone(), config),
                progress: ProgressAggregator::new(order),
                outcome: None,
            }),
            done: Condvar::new(),
        });

        let token = self.inner.cancellation.token_for(&session_id);
        self.inner
            .sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(session_id.clone(), handle.clone());

        let inner = self.inner.clone();
        let spawned = thread::Builder::new()
            .name(format!("scan-session-{}", &session_id[..8]))
            .spawn(move || run_session(inner, handle, token));

        if let Err(e) = spawned {
            self.inner
                .sessions
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .remove(&session_id);
            self.inner.cancellation.release(&session_id);
            self.inner.release_slot(&session_id);
            return Err(OrchestratorError::Failed {
                session: session_id,
                reason: format!("Failed to start session thread: {}", e),
            });
        }

        Ok(session_id)
    }

    /// Latest progress snapshot of a session
    pub fn get_progress(&self, session_id: &str) -> Result<AggregateProgress> {
        let handle = self.inner.handle(session_id)?;
        let state = handle.lock();
        Ok(state.progress.snapshot())
    }

    /// Snapshot of a session's full state
    pub fn get_session(&self, session_id: &str) -> Result<ScanSession> {
        let handle = self.inner.handle(session_id)?;
        let state = handle.lock();
        Ok(state.session.clone())
    }

    /// Request cancellation. Idempotent; a no-op for a finished session.
    pub fn cancel_session(&self, session_id: &str) -> Result<()> {
        self.inner.handle(session_id)?;
        if self.inner.cancellation.request_cancel(session_id) {
            info!(session = %session_id, "Cancellation requested");
        }
        Ok(())
    }

    /// Block until the session finishes, then archive it.
    ///
    /// Cancelled sessions return their partial aggregate; failed sessions
    /// return `OrchestratorError::Failed`.
    pub fn await_result(&self, session_id: &str) -> Result<AggregateResult> {
        let handle = self.inner.handle(session_id)?;

        let outcome = {
            let mut state = handle.lock();
            loop {
                if let Some(outcome) = state.outcome.clone() {
                    break outcome;
                }
                state = handle.done.wait(state).unwrap_or_else(|e| e.into_inner());
            }
        };

        self.inner
            .sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(session_id);
        self.inner.cancellation.release(session_id);

        match outcome {
            SessionOutcome::Finished(result) => Ok(result),
            SessionOutcome::Failed(reason) => Err(OrchestratorError::Failed {
                session: session_id.to_string(),
                reason,
            }),
        }
    }

    /// Start a session and wait for its result
    pub fn run(&self, config: ScanConfig) -> Result<AggregateResult> {
        let session_id = self.start_session(config)?;
        self.await_result(&session_id)
    }

    pub fn list_history(&self, limit: usize, offset: usize) -> Result<HistoryPage> {
        Ok(self.inner.history.list(limit, offset)?)
    }

    pub fn get_history_entry(&self, id: &str) -> Result<Option<HistoryEntry>> {
        Ok(self.inner.history.get(id)?)
    }

    pub fn delete_history_entry(&self, id: &str) -> Result<bool> {
        Ok(self.inner.history.delete(id)?)
    }

    pub fn clear_history(&self) -> Result<usize> {
        Ok(self.inner.history.clear()?)
    }
}

/// Finishes the session if the worker thread unwinds before doing so
struct FinishGuard {
    inner: Arc<Inner>,
    handle: Arc<SessionHandle>,
    armed: bool,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        error!(session = %self.handle.id, "Session thread stopped unexpectedly");
        self.inner.release_slot(&self.handle.id);
        let mut state = self.handle.lock();
        state.session.state = SessionState::Failed;
        state.session.ended_at = Some(Utc::now());
        state.outcome = Some(SessionOutcome::Failed(
            "session stopped unexpectedly".to_string(),
        ));
        self.inner.events.send(Event::Session(SessionEvent::Finished {
            session_id: self.handle.id.clone(),
            state: SessionState::Failed,
            duration_ms: 0,
        }));
        self.handle.done.notify_all();
    }
}

fn run_session(inner: Arc<Inner>, handle: Arc<SessionHandle>, token: CancellationToken) {
    let mut guard = FinishGuard {
        inner: inner.clone(),
        handle: handle.clone(),
        armed: true,
    };

    let started = Instant::now();
    let session_id = handle.id.clone();
    let config = handle.lock().session.config.clone();
    let order = config.enabled_modules();
    let runner = inner.runner.clone().with_deadline(config.module_timeout());
    let mut results = ResultAggregator::new(session_id.clone(), &order);

    info!(session = %session_id, modules = ?order, "Scan session started");
    {
        let mut state = handle.lock();
        state.session.state = SessionState::Running;
        inner.events.send(Event::Session(SessionEvent::Started {
            session_id: session_id.clone(),
            modules: order.clone(),
            paths: config.paths.clone(),
        }));
        inner.events.send(Event::Progress(state.progress.snapshot()));
    }

    let mut final_state = SessionState::Completed;
    let mut failure = None;

    for (index, &kind) in order.iter().enumerate() {
        if token.is_cancelled() {
            final_state = SessionState::Cancelled;
            break;
        }

        let desc = descriptor(kind);
        let fragment = desc.config_fragment(&config);
        {
            let mut state = handle.lock();
            state.session.modules[index].state.advance(ModuleRunState::Running {
                percent: 0.0,
                message: format!("Starting {}", kind),
            });
            let snapshot = state.progress.module_started(index);
            inner.events.send(Event::Module(ModuleEvent::Started { module: kind }));
            inner.events.send(Event::Progress(snapshot));
        }
        debug!(session = %session_id, module = %kind, "Module started");

        let sink = progress_sink(&inner, &handle, index, kind);
        let module_started = Instant::now();
        let outcome = runner.run(desc, fragment.clone(), sink, &token);
        let module_duration = module_started.elapsed().as_millis() as u64;

        let run_state = match outcome {
            ModuleOutcome::Completed { result } => ModuleRunState::Completed { result },
            ModuleOutcome::Errored { message } => ModuleRunState::Errored { message },
            ModuleOutcome::Cancelled => ModuleRunState::Cancelled,
        };
        results.fold(kind, &run_state);

        {
            let mut state = handle.lock();
            state.session.modules[index].state.advance(run_state.clone());
            let snapshot = state.progress.module_finished();
            inner.events.send(Event::Module(module_finished_event(kind, &run_state)));
            inner.events.send(Event::Progress(snapshot));
        }

        let entry = history_entry(&session_id, &config, &fragment, &run_state, module_duration);
        if let Err(e) = inner.history.append(entry) {
            error!(session = %session_id, module = %kind, error = %e, "Failed to record history");
            final_state = SessionState::Failed;
            failure = Some(format!("Could not record {} history: {}", kind, e));
            break;
        }

        if matches!(run_state, ModuleRunState::Cancelled) {
            final_state = SessionState::Cancelled;
            break;
        }
    }

    // A module that ignored the token may have run to completion after
    // cancellation was requested; the request still wins.
    if final_state == SessionState::Completed && token.is_cancelled() {
        final_state = SessionState::Cancelled;
    }
    if final_state == SessionState::Cancelled {
        results.cancel_pending();
    }

    let duration_ms = started.elapsed().as_millis() as u64;
    let aggregate = results.finish(final_state, duration_ms);
    let message = match (&final_state, &failure) {
        (SessionState::Failed, Some(reason)) => reason.clone(),
        (state, _) => format!("Scan {}", state.to_string().to_lowercase()),
    };

    inner.release_slot(&session_id);

    {
        let mut state = handle.lock();
        if final_state == SessionState::Cancelled {
            state.session.cancel_unfinished();
        }
        state.session.state = final_state;
        state.session.ended_at = Some(Utc::now());
        let snapshot = state.progress.finish(final_state, message);
        inner.events.send(Event::Progress(snapshot));
        inner.events.send(Event::Session(SessionEvent::Finished {
            session_id: session_id.clone(),
            state: final_state,
            duration_ms,
        }));
        state.outcome = Some(match failure {
            Some(reason) => SessionOutcome::Failed(reason),
            None => SessionOutcome::Finished(aggregate.clone()),
        });
        guard.armed = false;
        handle.done.notify_all();
    }

    info!(
        session = %session_id,
        state = %final_state,
        items = aggregate.total_items_found,
        savings_bytes = aggregate.total_savings_bytes,
        duration_ms,
        "Scan session finished"
    );
}

/// Sink that updates the session's run state and progress under its lock,
/// so snapshots reach subscribers in the order they were computed.
fn progress_sink(
    inner: &Arc<Inner>,
    handle: &Arc<SessionHandle>,
    index: usize,
    kind: ModuleKind,
) -> ProgressSink {
    let inner = inner.clone();
    let handle = handle.clone();
    ProgressSink::new(kind, move |progress| {
        let mut state = handle.lock();
        let still_running = state.session.modules[index]
            .state
            .advance(ModuleRunState::Running {
                percent: progress.percent,
                message: progress.message.clone(),
            });
        if !still_running {
            return;
        }
        let snapshot = state.progress.module_progress(&progress);
        inner.events.send(Event::Module(ModuleEvent::Progress(progress)));
        inner.events.send(Event::Progress(snapshot));
    })
}

fn module_finished_event(kind: ModuleKind, state: &ModuleRunState) -> ModuleEvent {
    match state {
        ModuleRunState::Completed { result } => ModuleEvent::Completed {
            module: kind,
            summary: result.summary(),
        },
        ModuleRunState::Errored { message } => ModuleEvent::Errored {
            module: kind,
            message: message.clone(),
        },
        _ => ModuleEvent::Cancelled { module: kind },
    }
}

fn history_entry(
    session_id: &str,
    config: &ScanConfig,
    fragment: &ModuleConfig,
    state: &ModuleRunState,
    duration_ms: u64,
) -> HistoryEntry {
    let status = match state {
        ModuleRunState::Completed { .. } => ScanStatus::Completed,
        ModuleRunState::Errored { message } => ScanStatus::Error(message.clone()),
        _ => ScanStatus::Cancelled,
    };

    let mut entry = HistoryEntry::without_result(
        fragment.kind(),
        Utc::now().timestamp(),
        config.path_strings(),
        duration_ms,
        status,
    );
    entry.session_id = Some(session_id.to_string());
    entry.settings = fragment.settings_json();

    if let ModuleRunState::Completed { result } = state {
        let summary = result.summary();
        entry.total_files = summary.files_examined;
        entry.groups_found = summary.groups_found;
        entry.duplicates_found = Some(summary.items_found);
        entry.potential_savings = Some(summary.savings_bytes);
    }

    entry
}
