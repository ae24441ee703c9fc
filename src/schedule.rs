//! Repeating timers polled from the host loop.

use std::time::{Duration, Instant};

/// Fixed-period timer that fires from `poll`
///
/// Never fires more than once per poll. A timer that falls more than one
/// period behind re-anchors to `now` instead of bursting.
#[derive(Debug, Clone)]
pub struct RepeatingTimer {
    period: Duration,
    next_due: Option<Instant>,
}

impl RepeatingTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Arm the timer; the first fire is one period after `now`
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now + self.period);
    }

    /// Arm the timer so the next poll fires immediately
    pub fn start_immediate(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    /// Disarm. Idempotent.
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true if the timer fired
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }

        let next = due + self.period;
        self.next_due = Some(if next <= now { now + self.period } else { next });
        true
    }
}
