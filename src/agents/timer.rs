// src/agents/timer.rs

//! Seconds-since-last-action counters that gate periodic behaviour.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionTimer {
    seconds_since: u64,
    period: u64,
}

impl ActionTimer {
    pub fn new(period: u64) -> Self {
        Self {
            seconds_since: 0,
            period,
        }
    }

    /// A timer that starts already elapsed, so the first step may act at once.
    pub fn primed(period: u64) -> Self {
        Self {
            seconds_since: period,
            period,
        }
    }

    pub fn advance(&mut self, seconds: u64) {
        self.seconds_since = self.seconds_since.saturating_add(seconds);
    }

    pub fn is_due(&self) -> bool {
        self.seconds_since >= self.period
    }

    pub fn reset(&mut self) {
        self.seconds_since = 0;
    }

    pub fn seconds_since(&self) -> u64 {
        self.seconds_since
    }

    pub fn period(&self) -> u64 {
        self.period
    }
}
