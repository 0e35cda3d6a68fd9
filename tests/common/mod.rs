//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use crossbeam_channel::Receiver;
use scan_orchestrator::core::cancel::CancellationToken;
use scan_orchestrator::core::history::{HistoryEntry, HistoryPage, HistoryStore};
use scan_orchestrator::core::modules::{
    DuplicateGroup, DuplicatesResult, LargeFileInfo, LargeFilesResult, ModuleCollaborator,
    ModuleConfig, ModuleKind, ModuleResult,
};
use scan_orchestrator::core::progress::ProgressSink;
use scan_orchestrator::error::{HistoryError, ModuleError};
use scan_orchestrator::events::{Event, EventReceiver, ModuleEvent, SessionEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// What a fake module does once invoked
#[derive(Clone)]
pub enum Script {
    /// Report each percent, then return the result
    Complete {
        progress: Vec<f64>,
        result: ModuleResult,
    },
    Fail(String),
    Panic,
    /// Spin until cancelled
    WaitForCancel,
    /// Block until the gate receives (or closes), then return the result
    Gate {
        gate: Receiver<()>,
        result: ModuleResult,
    },
    /// Sleep, ignoring cancellation, then return the result
    Sleep {
        duration: Duration,
        result: ModuleResult,
    },
}

pub struct FakeModule {
    kind: ModuleKind,
    script: Script,
    calls: AtomicUsize,
}

impl FakeModule {
    pub fn new(kind: ModuleKind, script: Script) -> Arc<Self> {
        Arc::new(Self {
            kind,
            script,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ModuleCollaborator for FakeModule {
    fn kind(&self) -> ModuleKind {
        self.kind
    }

    fn execute(
        &self,
        _config: &ModuleConfig,
        progress: &ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<ModuleResult, ModuleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::Complete {
                progress: steps,
                result,
            } => {
                for percent in steps {
                    progress.report("working", *percent, format!("{}%", percent));
                }
                Ok(result.clone())
            }
            Script::Fail(message) => Err(ModuleError::Failed(message.clone())),
            Script::Panic => panic!("fake module exploded"),
            Script::WaitForCancel => {
                let start = Instant::now();
                while start.elapsed() < Duration::from_secs(10) {
                    if cancel.is_cancelled() {
                        return Err(ModuleError::Cancelled);
                    }
                    thread::sleep(Duration::from_millis(2));
                }
                Err(ModuleError::Failed("never cancelled".to_string()))
            }
            Script::Gate { gate, result } => {
                let _ = gate.recv_timeout(Duration::from_secs(10));
                Ok(result.clone())
            }
            Script::Sleep { duration, result } => {
                thread::sleep(*duration);
                Ok(result.clone())
            }
        }
    }
}

/// Three groups of two identical files, 500 bytes reclaimable
pub fn duplicates_result() -> ModuleResult {
    let sizes = [100u64, 150, 250];
    let groups = sizes
        .iter()
        .enumerate()
        .map(|(i, size)| DuplicateGroup {
            id: format!("group-{}", i),
            files: vec![format!("/p/a{}.jpg", i), format!("/p/b{}.jpg", i)],
            representative: format!("/p/a{}.jpg", i),
            duplicate_size_bytes: *size,
        })
        .collect();

    ModuleResult::Duplicates(DuplicatesResult {
        groups,
        total_files_scanned: 40,
        potential_savings_bytes: 500,
        duration_ms: 3,
    })
}

/// Twelve files, 900 bytes in total
pub fn large_files_result() -> ModuleResult {
    let files: Vec<LargeFileInfo> = (0..12)
        .map(|i| LargeFileInfo {
            path: format!("/p/big{}.mov", i),
            filename: format!("big{}.mov", i),
            size_bytes: 75,
            file_type: "mov".to_string(),
            modified: 0,
        })
        .collect();

    ModuleResult::LargeFiles(LargeFilesResult {
        files,
        total_size_bytes: 900,
        files_scanned: 40,
        duration_ms: 2,
    })
}

pub fn complete(kind: ModuleKind, result: ModuleResult) -> Arc<FakeModule> {
    FakeModule::new(
        kind,
        Script::Complete {
            progress: vec![0.0, 50.0, 100.0],
            result,
        },
    )
}

/// Rejects every append
pub struct FailingHistory;

impl HistoryStore for FailingHistory {
    fn append(&self, _entry: HistoryEntry) -> Result<String, HistoryError> {
        Err(HistoryError::Unavailable("disk full".to_string()))
    }

    fn list(&self, _limit: usize, _offset: usize) -> Result<HistoryPage, HistoryError> {
        Ok(HistoryPage {
            entries: Vec::new(),
            total_count: 0,
        })
    }

    fn get(&self, _id: &str) -> Result<Option<HistoryEntry>, HistoryError> {
        Ok(None)
    }

    fn delete(&self, _id: &str) -> Result<bool, HistoryError> {
        Ok(false)
    }

    fn clear(&self) -> Result<usize, HistoryError> {
        Ok(0)
    }
}

/// Receive events until `stop` matches, returning everything seen
pub fn collect_until<F>(receiver: &EventReceiver, stop: F) -> Vec<Event>
where
    F: Fn(&Event) -> bool,
{
    let mut seen = Vec::new();
    let deadline = Instant::now() + EVENT_TIMEOUT;
    while Instant::now() < deadline {
        let Some(event) = receiver.recv_timeout(Duration::from_millis(50)) else {
            continue;
        };
        let done = stop(&event);
        seen.push(event);
        if done {
            break;
        }
    }
    seen
}

pub fn is_session_finished(event: &Event) -> bool {
    matches!(event, Event::Session(SessionEvent::Finished { .. }))
}

pub fn is_module_started(kind: ModuleKind) -> impl Fn(&Event) -> bool {
    move |event| matches!(event, Event::Module(ModuleEvent::Started { module }) if *module == kind)
}

/// Overall percents from every progress snapshot, in order
pub fn overall_percents(events: &[Event]) -> Vec<u8> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Progress(p) => Some(p.overall_percent),
            _ => None,
        })
        .collect()
}
