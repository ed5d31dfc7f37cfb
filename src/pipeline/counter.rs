//! Outstanding-work counter: incremented on dispatch, decremented by workers, waited on by main.

use std::sync::{Condvar, Mutex, PoisonError};

#[derive(Debug, Default)]
pub struct WorkCounter {
    pending: Mutex<usize>,
    drained: Condvar,
}

impl WorkCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `n` units of work. Must happen before the work is made visible to workers.
    pub fn add(&self, n: usize) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        *pending += n;
    }

    /// Mark one unit done; wakes waiters when the count reaches zero.
    pub fn done(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        debug_assert!(*pending > 0, "WorkCounter::done without matching add");
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.drained.notify_all();
        }
    }

    pub fn pending(&self) -> usize {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until every added unit has been marked done.
    pub fn wait(&self) {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let _drained = self
            .drained
            .wait_while(pending, |n| *n > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }
}
