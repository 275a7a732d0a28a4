/*!
 * Racy Baseline (UNSAFE FOR COUNTING)
 *
 * A deliberately broken counter: the read and the write of each increment
 * are separate operations with a gap between them, so concurrent increments
 * overwrite each other and updates are silently lost.
 *
 * Kept only as a benchmark baseline and as the subject of the lost-update
 * demonstration. It is not a `Strategy` variant and nothing constructs it
 * by default. The storage is still an atomic so the race is a logic race,
 * never undefined behaviour.
 */

use super::traits::CounterOps;
use std::sync::atomic::{AtomicI64, Ordering};
use std::thread;
use std::time::Duration;

/// Unsynchronized read-modify-write counter that loses updates
pub struct RacyCounter {
    value: AtomicI64,
    window: Duration,
}

impl RacyCounter {
    /// Build the racy baseline
    ///
    /// `window` is the pause between reading and writing back. Zero yields
    /// to the scheduler instead of sleeping.
    pub fn unsynchronized(window: Duration) -> Self {
        Self {
            value: AtomicI64::new(0),
            window,
        }
    }

    /// How far the current value falls short of `expected`
    pub fn lost_updates(&self, expected: i64) -> i64 {
        expected.wrapping_sub(self.get())
    }
}

impl CounterOps for RacyCounter {
    fn increment(&self) -> i64 {
        let loaded = self.value.load(Ordering::Relaxed);

        if self.window.is_zero() {
            thread::yield_now();
        } else {
            thread::sleep(self.window);
        }

        let next = loaded.wrapping_add(1);
        self.value.store(next, Ordering::Relaxed);
        next
    }

    fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    fn name(&self) -> &'static str {
        "racy-unsynchronized"
    }
}
