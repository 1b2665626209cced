//! Cooperative stop signal shared by every stream of a run.

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Once raised, streams leave their loop at the next check and finish
/// normally: the open batch is committed and the sink closed.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<StopInner>,
}

#[derive(Debug, Default)]
struct StopInner {
    stopped: AtomicBool,
    lock: Mutex<()>,
    wakeup: Condvar,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal and wake every sleeper.
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
        let _lock = self.inner.lock.lock();
        self.inner.wakeup.notify_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }

    /// Sleep until `deadline` or until the signal is raised, whichever is
    /// first. Returns `true` if the signal is raised.
    pub fn sleep_until(&self, deadline: Instant) -> bool {
        let mut lock = self.inner.lock.lock();
        while !self.is_stopped() {
            if self.inner.wakeup.wait_until(&mut lock, deadline).timed_out() {
                break;
            }
        }
        self.is_stopped()
    }

    /// A `duration` past the end of the clock sleeps until the signal is
    /// raised.
    pub fn sleep_for(&self, duration: Duration) -> bool {
        match Instant::now().checked_add(duration) {
            Some(deadline) => self.sleep_until(deadline),
            None => {
                self.wait();
                true
            }
        }
    }

    /// Block until the signal is raised.
    pub fn wait(&self) {
        let mut lock = self.inner.lock.lock();
        while !self.is_stopped() {
            self.inner.wakeup.wait(&mut lock);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_sleep_runs_to_deadline_without_stop() {
        let signal = StopSignal::new();
        let start = Instant::now();
        assert!(!signal.sleep_for(Duration::from_millis(30)));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_stop_wakes_sleeper_early() {
        let signal = StopSignal::new();
        let sleeper = signal.clone();
        let start = Instant::now();
        let handle = thread::spawn(move || sleeper.sleep_for(Duration::from_secs(10)));

        thread::sleep(Duration::from_millis(20));
        signal.stop();

        assert!(handle.join().unwrap());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_already_stopped_returns_immediately() {
        let signal = StopSignal::new();
        signal.stop();
        assert!(signal.is_stopped());
        assert!(signal.sleep_for(Duration::from_secs(10)));
    }

    #[test]
    fn test_unbounded_sleep_ends_on_stop() {
        let signal = StopSignal::new();
        let sleeper = signal.clone();
        let handle = thread::spawn(move || sleeper.sleep_for(Duration::MAX));

        thread::sleep(Duration::from_millis(20));
        signal.stop();

        assert!(handle.join().unwrap());
    }
}
