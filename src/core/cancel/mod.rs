//! # Cancellation
//!
//! Cooperative cancellation for scan sessions.
//!
//! A [`CancellationToken`] is a shared flag. Modules may poll it while they
//! work; the session controller always checks it between modules and never
//! starts another module once it is set. Nothing is ever forcibly stopped.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A shared, checkable stop request
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    parent: Option<Arc<AtomicBool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that is cancelled when either it or `self` is.
    ///
    /// Cancelling the child leaves `self` untouched.
    pub fn child(&self) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            parent: Some(self.flag.clone()),
        }
    }

    /// Request a stop. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Non-blocking check, callable from any thread
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
            || self
                .parent
                .as_ref()
                .is_some_and(|p| p.load(Ordering::SeqCst))
    }
}

/// Hands out one token per session and cancels by session id
#[derive(Debug, Default)]
pub struct CancellationController {
    tokens: Mutex<HashMap<String, CancellationToken>>,
}

impl CancellationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or return the existing) token for a session
    pub fn token_for(&self, session_id: &str) -> CancellationToken {
        let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        tokens
            .entry(session_id.to_string())
            .or_default()
            .clone()
    }

    /// Mark the session's token as cancelled.
    ///
    /// Returns false when no token exists for the session.
    pub fn request_cancel(&self, session_id: &str) -> bool {
        let tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        match tokens.get(session_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Drop the session's token once the session is archived
    pub fn release(&self, session_id: &str) {
        let mut tokens = self.tokens.lock().unwrap_or_else(|e| e.into_inner());
        tokens.remove(session_id);
    }
}
