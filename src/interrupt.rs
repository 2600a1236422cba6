//! Cooperative interruption for sleeping threads.
//!
//! Every thread owns an interrupt flag. [`Interrupter::current`] hands out a
//! handle to the calling thread's flag that other threads can use to wake it
//! from [`interruptible_sleep`]. A pending interrupt is consumed by the next
//! sleep, which then returns immediately.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Returned by [`interruptible_sleep`] when the wait was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("sleep interrupted")
    }
}

impl std::error::Error for Interrupted {}

#[derive(Default)]
struct Flag {
    pending: Mutex<bool>,
    wake: Condvar,
}

thread_local! {
    static FLAG: Arc<Flag> = Arc::new(Flag::default());
}

/// Handle that interrupts the thread it was created on.
#[derive(Clone)]
pub struct Interrupter {
    flag: Arc<Flag>,
}

impl Interrupter {
    /// Returns a handle for the calling thread.
    pub fn current() -> Self {
        Self {
            flag: FLAG.with(Arc::clone),
        }
    }

    /// Marks the owning thread as interrupted and wakes it if it is sleeping.
    pub fn interrupt(&self) {
        let mut pending = self.flag.pending.lock();
        *pending = true;
        self.flag.wake.notify_all();
    }

    /// Whether an interrupt is waiting to be consumed.
    pub fn is_pending(&self) -> bool {
        *self.flag.pending.lock()
    }
}

impl fmt::Debug for Interrupter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interrupter")
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Blocks the calling thread for `duration` unless it is interrupted first.
///
/// The interrupt flag is cleared when it is observed.
pub fn interruptible_sleep(duration: Duration) -> Result<(), Interrupted> {
    let deadline = Instant::now() + duration;
    FLAG.with(|flag| {
        let mut pending = flag.pending.lock();
        loop {
            if *pending {
                *pending = false;
                return Err(Interrupted);
            }
            if Instant::now() >= deadline {
                return Ok(());
            }
            // spurious wakeups loop back to re-check both conditions
            flag.wake.wait_until(&mut pending, deadline);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn uninterrupted_sleep_runs_full_duration() {
        let start = Instant::now();
        assert_eq!(interruptible_sleep(Duration::from_millis(20)), Ok(()));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn pending_interrupt_cuts_sleep_short_and_is_cleared() {
        let me = Interrupter::current();
        me.interrupt();
        assert!(me.is_pending());

        let start = Instant::now();
        assert_eq!(interruptible_sleep(Duration::from_secs(5)), Err(Interrupted));
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(!me.is_pending());

        assert_eq!(interruptible_sleep(Duration::from_millis(1)), Ok(()));
    }

    #[test]
    fn interrupt_from_another_thread_wakes_sleeper() {
        let (tx, rx) = mpsc::channel();
        let sleeper = thread::spawn(move || {
            tx.send(Interrupter::current()).unwrap();
            let start = Instant::now();
            let outcome = interruptible_sleep(Duration::from_secs(10));
            (outcome, start.elapsed())
        });

        let handle = rx.recv().unwrap();
        thread::sleep(Duration::from_millis(20));
        handle.interrupt();

        let (outcome, elapsed) = sleeper.join().unwrap();
        assert_eq!(outcome, Err(Interrupted));
        assert!(elapsed < Duration::from_secs(10));
    }

    #[test]
    fn interrupt_is_per_thread() {
        Interrupter::current().interrupt();
        let other = thread::spawn(|| interruptible_sleep(Duration::from_millis(5)))
            .join()
            .unwrap();
        assert_eq!(other, Ok(()));
        assert_eq!(interruptible_sleep(Duration::from_millis(5)), Err(Interrupted));
    }
}
