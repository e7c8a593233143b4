use std::sync::Arc;

use strum_macros::Display;
use tokio::sync::watch;

/// Why the session was told to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum TerminationReason {
    DurationElapsed,
    Interrupted,
}

/// Termination signal shared by every loop of a session.
/// Can be raised exactly once; clones observe the same state.
#[derive(Debug, Clone)]
pub struct Termination {
    tx: Arc<watch::Sender<Option<TerminationReason>>>,
}

impl Default for Termination {
    fn default() -> Self {
        Self::new()
    }
}

impl Termination {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Raise the signal. Returns false if it was already raised, in which
    /// case the original reason is kept.
    pub fn trigger(&self, reason: TerminationReason) -> bool {
        self.tx.send_if_modified(|state| {
            if state.is_some() {
                return false;
            }
            *state = Some(reason);
            true
        })
    }

    pub fn is_set(&self) -> bool {
        self.tx.borrow().is_some()
    }

    #[allow(dead_code)]
    pub fn reason(&self) -> Option<TerminationReason> {
        *self.tx.borrow()
    }

    /// Resolves once the signal has been raised.
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|state| state.is_some()).await;
    }
}
