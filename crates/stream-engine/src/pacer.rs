//! Rate pacing for a single stream.

use crate::stop::StopSignal;
use std::time::{Duration, Instant};

/// Being ahead by less than this does not warrant a sleep.
const MIN_SLEEP: Duration = Duration::from_millis(1);

/// Falling further behind than this resets the schedule instead of bursting
/// to catch up.
const MAX_LAG: Duration = Duration::from_secs(1);

/// Keeps a stream's cumulative row count on a `rows / events_per_second`
/// schedule.
///
/// Row `n` is due at `origin + n / events_per_second`. After each row the
/// stream sleeps until the next row is due, so the observed rate over any
/// window covering several intervals stays at or below the target.
#[derive(Debug, Clone)]
pub struct Pacer {
    events_per_second: f64,
    origin: Instant,
    /// Rows already accounted for when `origin` was last moved
    rows_at_origin: u64,
}

impl Pacer {
    /// `events_per_second` must be positive and finite.
    pub fn new(events_per_second: f64, origin: Instant) -> Self {
        Self {
            events_per_second,
            origin,
            rows_at_origin: 0,
        }
    }

    pub fn events_per_second(&self) -> f64 {
        self.events_per_second
    }

    /// When row number `rows` (0-based count of rows already emitted) is due.
    /// `None` when that lies beyond what an `Instant` can represent.
    pub fn due(&self, rows: u64) -> Option<Instant> {
        let ahead = rows.saturating_sub(self.rows_at_origin) as f64 / self.events_per_second;
        Duration::try_from_secs_f64(ahead)
            .ok()
            .and_then(|offset| self.origin.checked_add(offset))
    }

    /// Called after `rows_emitted` rows. Sleeps until the next row is due,
    /// never past `deadline`, and returns early if `stop` is raised. With
    /// neither a due time nor a deadline it sleeps until `stop` is raised.
    ///
    /// Returns how long it slept.
    pub fn pace(
        &mut self,
        rows_emitted: u64,
        deadline: Option<Instant>,
        stop: &StopSignal,
    ) -> Duration {
        let now = Instant::now();
        let due = self.due(rows_emitted);

        if due
            .and_then(|due| due.checked_add(MAX_LAG))
            .is_some_and(|late| late < now)
        {
            self.origin = now;
            self.rows_at_origin = rows_emitted;
            return Duration::ZERO;
        }

        let target = match (due, deadline) {
            (Some(due), Some(deadline)) => Some(due.min(deadline)),
            (Some(due), None) => Some(due),
            (None, deadline) => deadline,
        };
        match target {
            Some(target) if target <= now + MIN_SLEEP => return Duration::ZERO,
            Some(target) => {
                stop.sleep_until(target);
            }
            None => stop.wait(),
        }
        now.elapsed()
    }
}
