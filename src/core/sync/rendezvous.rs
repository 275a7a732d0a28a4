/*!
 * Condition-Predicate Rendezvous
 *
 * One or more threads block until a boolean predicate becomes true; another
 * thread sets it under the same lock and signals.
 *
 * Two rules keep this correct:
 * - Waiters re-check the predicate in a loop after every wake, since a
 *   wake (spurious or broadcast) does not imply the predicate holds.
 * - Notifiers set the predicate while holding the lock, so a waiter cannot
 *   check, miss the signal, and then sleep forever.
 */

use super::traits::WakeResult;
use crate::core::errors::{WaitError, WaitResult};
use parking_lot::{Condvar, Mutex};
use std::time::{Duration, Instant};
use tracing::trace;

/// Predicate-guarded wait/notify point
#[derive(Default)]
pub struct Rendezvous {
    ready: Mutex<bool>,
    condvar: Condvar,
}

impl Rendezvous {
    /// Create with the predicate false
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until the predicate is true
    pub fn wait(&self) {
        let mut ready = self.ready.lock();
        while !*ready {
            self.condvar.wait(&mut ready);
        }
    }

    /// Block until the predicate is true or `timeout` elapses
    ///
    /// Returns `Err(WaitError::Timeout)` only if the predicate is still false
    /// at the deadline. A timeout too large to represent as a deadline
    /// waits without one.
    pub fn wait_timeout(&self, timeout: Duration) -> WaitResult<()> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return Ok(());
        };
        let mut ready = self.ready.lock();
        while !*ready {
            if self.condvar.wait_until(&mut ready, deadline).timed_out() {
                return if *ready { Ok(()) } else { Err(WaitError::Timeout) };
            }
        }
        Ok(())
    }

    /// Set the predicate and wake one waiter
    pub fn notify_one(&self) -> WakeResult {
        let mut ready = self.ready.lock();
        *ready = true;
        let woken = self.condvar.notify_one();
        trace!(woken, "rendezvous notify_one");
        WakeResult::from_count(usize::from(woken))
    }

    /// Set the predicate and wake every waiter
    pub fn notify_all(&self) -> WakeResult {
        let mut ready = self.ready.lock();
        *ready = true;
        let woken = self.condvar.notify_all();
        trace!(woken, "rendezvous notify_all");
        WakeResult::from_count(woken)
    }

    /// Current predicate value
    pub fn is_set(&self) -> bool {
        *self.ready.lock()
    }

    /// Clear the predicate so the rendezvous can be reused
    pub fn reset(&self) {
        *self.ready.lock() = false;
    }
}
