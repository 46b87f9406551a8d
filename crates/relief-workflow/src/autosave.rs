//! Auto-save debounce countdown.
//!
//! The countdown is driven by discrete ticks (one per second in production)
//! so that it can be tested without a clock. At most one countdown is live:
//! arming again restarts it instead of starting a second one.

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSaveTimer {
    interval: u32,
    remaining: Option<u32>,
}

impl AutoSaveTimer {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            remaining: None,
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// Start the countdown, or restart it if one is already running.
    pub fn arm(&mut self) {
        self.remaining = Some(self.interval);
    }

    /// Restart a running countdown. Does nothing when none is armed.
    pub fn reset(&mut self) {
        if self.remaining.is_some() {
            self.arm();
        }
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Seconds left, 0 when no countdown is running.
    pub fn remaining(&self) -> u32 {
        self.remaining.unwrap_or(0)
    }

    /// Advance one tick. Returns `true` exactly once, on the tick that
    /// reaches zero; the countdown is cleared at that point.
    pub fn tick(&mut self) -> bool {
        match self.remaining {
            None => false,
            Some(left) if left <= 1 => {
                self.remaining = None;
                true
            }
            Some(left) => {
                self.remaining = Some(left - 1);
                false
            }
        }
    }
}

/// Snapshot of the auto-save state exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoSaveState {
    pub is_dirty: bool,
    pub last_saved_at: Option<DateTime<Utc>>,
    pub countdown_seconds: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_on_last_tick() {
        let mut timer = AutoSaveTimer::new(60);
        timer.arm();
        for _ in 0..59 {
            assert!(!timer.tick());
        }
        assert_eq!(timer.remaining(), 1);
        assert!(timer.tick());
        assert_eq!(timer.remaining(), 0);
        assert!(!timer.is_armed());
        assert!(!timer.tick());
    }

    #[test]
    fn test_arm_restarts_instead_of_stacking() {
        let mut timer = AutoSaveTimer::new(60);
        timer.arm();
        for _ in 0..30 {
            timer.tick();
        }
        timer.arm();
        assert_eq!(timer.remaining(), 60);
    }

    #[test]
    fn test_reset_never_arms() {
        let mut timer = AutoSaveTimer::new(10);
        timer.reset();
        assert!(!timer.is_armed());

        timer.arm();
        timer.tick();
        timer.reset();
        assert_eq!(timer.remaining(), 10);
    }

    #[test]
    fn test_cancel() {
        let mut timer = AutoSaveTimer::new(5);
        timer.arm();
        timer.cancel();
        assert!(!timer.tick());
        assert_eq!(timer.remaining(), 0);
    }
}
