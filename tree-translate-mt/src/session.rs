//! Cancel-on-new-request bookkeeping
//!
//! A [`TranslationSession`] stands for one user-facing place that starts
//! translations, such as an editor pane. Every request begun on it gets a
//! [`RequestTicket`]; beginning a new request makes all earlier tickets stale.
//! A translation holding a stale ticket gives up before its next gateway call.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Default)]
pub struct TranslationSession {
    generation: Arc<AtomicU64>,
}

/// Proof that a request is (or was) the newest one of its session.
#[derive(Debug, Clone)]
pub struct RequestTicket {
    generation: Arc<AtomicU64>,
    id: u64,
}

impl TranslationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier one.
    pub fn begin(&self) -> RequestTicket {
        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        RequestTicket {
            generation: Arc::clone(&self.generation),
            id,
        }
    }
}

impl RequestTicket {
    /// A ticket not tied to any session; it is never superseded.
    pub fn detached() -> Self {
        TranslationSession::new().begin()
    }

    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.id
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}
