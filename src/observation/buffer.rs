use std::sync::{Arc, Mutex, MutexGuard};

use super::record::ObservationRecord;

/// Append-only, thread-safe log of observation records.
///
/// Cloning gives another handle on the same log. The lock is only held for
/// the duration of a single append or read, never across hardware calls.
#[derive(Debug, Clone, Default)]
pub struct ObservationLog {
    records: Arc<Mutex<Vec<ObservationRecord>>>,
}

impl ObservationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, record: ObservationRecord) {
        self.lock().push(record);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the current contents.
    #[allow(dead_code)]
    pub fn records(&self) -> Vec<ObservationRecord> {
        self.lock().clone()
    }

    /// Runs `f` with the lock held, so no append can interleave.
    pub fn with_records<T>(&self, f: impl FnOnce(&[ObservationRecord]) -> T) -> T {
        let guard = self.lock();
        f(&guard)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ObservationRecord>> {
        // A panicking appender cannot leave a half-written record behind,
        // so a poisoned lock still guards a consistent vector.
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
