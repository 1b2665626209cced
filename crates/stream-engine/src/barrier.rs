//! Countdown barrier released once per stream.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Counter initialised to the number of streams; waiters wake when it hits
/// zero.
///
/// Decrements only happen through [`BarrierGuard`], so each stream releases
/// its slot exactly once even when it fails to start or panics.
#[derive(Debug, Clone)]
pub struct CompletionBarrier {
    inner: Arc<BarrierInner>,
}

#[derive(Debug)]
struct BarrierInner {
    remaining: Mutex<usize>,
    zero: Condvar,
}

impl CompletionBarrier {
    pub fn new(count: usize) -> Self {
        Self {
            inner: Arc::new(BarrierInner {
                remaining: Mutex::new(count),
                zero: Condvar::new(),
            }),
        }
    }

    /// Slots still outstanding.
    pub fn remaining(&self) -> usize {
        *self.inner.remaining.lock()
    }

    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Hand out one slot. Dropping the guard releases it.
    pub fn guard(&self) -> BarrierGuard {
        BarrierGuard {
            barrier: Some(self.clone()),
        }
    }

    /// Block until every slot has been released.
    pub fn wait(&self) {
        let mut remaining = self.inner.remaining.lock();
        while *remaining > 0 {
            self.inner.zero.wait(&mut remaining);
        }
    }

    /// Block for at most `timeout`. Returns `true` if the barrier reached zero.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return true;
        };
        let mut remaining = self.inner.remaining.lock();
        while *remaining > 0 {
            if self
                .inner
                .zero
                .wait_until(&mut remaining, deadline)
                .timed_out()
            {
                break;
            }
        }
        *remaining == 0
    }

    fn count_down(&self) {
        let mut remaining = self.inner.remaining.lock();
        match *remaining {
            0 => warn!("Completion barrier released more times than it was sized for"),
            1 => {
                *remaining = 0;
                self.inner.zero.notify_all();
            }
            _ => *remaining -= 1,
        }
    }
}

/// One outstanding slot of a [`CompletionBarrier`].
#[derive(Debug)]
#[must_use = "dropping the guard releases the barrier slot immediately"]
pub struct BarrierGuard {
    barrier: Option<CompletionBarrier>,
}

impl BarrierGuard {
    /// Release the slot now.
    pub fn release(mut self) {
        if let Some(barrier) = self.barrier.take() {
            barrier.count_down();
        }
    }
}

impl Drop for BarrierGuard {
    fn drop(&mut self) {
        if let Some(barrier) = self.barrier.take() {
            barrier.count_down();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_release_counts_down_once() {
        let barrier = CompletionBarrier::new(2);
        let first = barrier.guard();
        let second = barrier.guard();

        first.release();
        assert_eq!(barrier.remaining(), 1);

        drop(second);
        assert!(barrier.is_complete());
    }

    #[test]
    fn test_zero_sized_barrier_is_complete() {
        let barrier = CompletionBarrier::new(0);
        assert!(barrier.wait_timeout(Duration::from_millis(1)));
        barrier.wait();
    }

    #[test]
    fn test_extra_release_saturates() {
        let barrier = CompletionBarrier::new(1);
        barrier.guard().release();
        barrier.guard().release();
        assert_eq!(barrier.remaining(), 0);
    }

    #[test]
    fn test_wait_timeout_expires() {
        let barrier = CompletionBarrier::new(1);
        let _guard = barrier.guard();
        let start = Instant::now();
        assert!(!barrier.wait_timeout(Duration::from_millis(50)));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_waiter_wakes_when_threads_release() {
        let barrier = CompletionBarrier::new(3);
        let handles: Vec<_> = (0..3)
            .map(|i| {
                let guard = barrier.guard();
                thread::spawn(move || {
                    thread::sleep(Duration::from_millis(10 * (i + 1)));
                    drop(guard);
                })
            })
            .collect();

        assert!(barrier.wait_timeout(Duration::from_secs(5)));
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_panicking_holder_still_releases() {
        let barrier = CompletionBarrier::new(1);
        let guard = barrier.guard();
        let handle = thread::spawn(move || {
            let _guard = guard;
            panic!("stream blew up");
        });

        assert!(handle.join().is_err());
        assert!(barrier.is_complete());
    }
}
