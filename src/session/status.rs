use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum LoopKind {
    Pointing,
    Spectrometer,
    Sdr,
    Snapshot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    Running,
    StoppedOnTimeout,
    StoppedOnSignal,
    StoppedOnError(String),
}

impl LoopState {
    pub fn is_error(&self) -> bool {
        matches!(self, LoopState::StoppedOnError(_))
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopState::Running => write!(f, "running"),
            LoopState::StoppedOnTimeout => write!(f, "stopped (duration elapsed)"),
            LoopState::StoppedOnSignal => write!(f, "stopped (termination signal)"),
            LoopState::StoppedOnError(reason) => write!(f, "stopped on error: {}", reason),
        }
    }
}

/// Last known state of every loop in a session.
#[derive(Debug, Clone, Default)]
pub struct StatusBoard {
    states: Arc<Mutex<BTreeMap<LoopKind, LoopState>>>,
}

impl StatusBoard {
    pub fn set(&self, kind: LoopKind, state: LoopState) {
        self.states
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(kind, state);
    }

    #[allow(dead_code)]
    pub fn get(&self, kind: LoopKind) -> Option<LoopState> {
        self.states
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(&kind)
            .cloned()
    }

    pub fn states(&self) -> BTreeMap<LoopKind, LoopState> {
        self.states.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}
