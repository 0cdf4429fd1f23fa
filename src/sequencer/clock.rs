// Tick clock - the single repeating beat timer
// Polled from the UI frame loop; deadlines advance by whole periods so
// the beat grid never drifts with frame timing.

use std::time::{Duration, Instant};

/// Beyond this many overdue beats (window hidden, machine asleep) the
/// backlog is dropped and a single beat is played instead
pub const MAX_CATCH_UP_TICKS: u32 = 4;

/// Length of one beat: 60000 / bpm milliseconds
pub fn beat_period(bpm: u32) -> Duration {
    Duration::from_nanos(60_000_000_000 / u64::from(bpm.max(1)))
}

#[derive(Debug, Clone)]
pub struct TickClock {
    period: Duration,
    next_deadline: Option<Instant>,
}

impl TickClock {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_deadline: None,
        }
    }

    pub fn from_bpm(bpm: u32) -> Self {
        Self::new(beat_period(bpm))
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.next_deadline.is_some()
    }

    /// Start ticking; the first tick is due one period after `now`
    pub fn arm(&mut self, now: Instant) {
        self.next_deadline = Some(now + self.period);
    }

    pub fn disarm(&mut self) {
        self.next_deadline = None;
    }

    /// Change the period. A running clock restarts its countdown from `now`.
    pub fn set_period(&mut self, period: Duration, now: Instant) {
        self.period = period;
        if self.is_armed() {
            self.arm(now);
        }
    }

    /// Number of ticks that fell due up to `now`, advancing the deadline past them
    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        let Some(deadline) = self.next_deadline else {
            return 0;
        };
        if now < deadline {
            return 0;
        }

        let period_nanos = self.period.as_nanos().max(1);
        let overdue = (now - deadline).as_nanos() / period_nanos + 1;

        if overdue > u128::from(MAX_CATCH_UP_TICKS) {
            self.next_deadline = Some(now + self.period);
            return 1;
        }

        // overdue <= MAX_CATCH_UP_TICKS here
        let count = overdue as u32;
        self.next_deadline = Some(deadline + self.period * count);
        count
    }

    /// Time left before the next tick, `None` when disarmed
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}
