//! Suppression tracker
//!
//! A time-windowed dedup gate keyed by event-type code. Each code moves
//! `Idle → Suppressing` when it is first seen (or seen again after expiry)
//! and stays silently suppressed for the configured window. Expiry is
//! detected lazily on the next lookup; there is no background timer, no cap
//! on tracked types, and no persistence across restarts.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

#[derive(Debug)]
pub struct SuppressionTracker {
    window: Duration,
    suppressed_since: HashMap<u32, DateTime<Utc>>,
}

impl SuppressionTracker {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            suppressed_since: HashMap::new(),
        }
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Self::new(Duration::minutes(i64::from(minutes)))
    }

    /// Whether an event of this type should be dropped at `now`.
    ///
    /// A zero window disables the feature entirely, with no bookkeeping.
    /// Otherwise a miss (or an expired hit) prunes every stale window,
    /// records `now` as this type's new window start and lets the event
    /// through; a live hit suppresses without mutating state.
    pub fn should_suppress(&mut self, event_type: u32, now: DateTime<Utc>) -> bool {
        if self.window.is_zero() {
            return false;
        }

        if let Some(since) = self.suppressed_since.get(&event_type) {
            if *since + self.window >= now {
                return true;
            }
        }

        let window = self.window;
        self.suppressed_since
            .retain(|_, since| *since + window >= now);
        self.suppressed_since.insert(event_type, now);
        false
    }

    /// Number of event types currently tracked.
    pub fn tracked_types(&self) -> usize {
        self.suppressed_since.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 3, 1, 12, minute, 0).unwrap()
    }

    #[test]
    fn zero_window_disables_suppression() {
        let mut tracker = SuppressionTracker::from_minutes(0);
        assert!(!tracker.should_suppress(1, at(0)));
        assert!(!tracker.should_suppress(1, at(0)));
        assert_eq!(tracker.tracked_types(), 0);
    }

    #[test]
    fn repeats_within_the_window_are_suppressed() {
        let mut tracker = SuppressionTracker::from_minutes(10);
        assert!(!tracker.should_suppress(1, at(0)));
        assert!(tracker.should_suppress(1, at(1)));
        assert!(tracker.should_suppress(1, at(9)));
    }

    #[test]
    fn the_window_reopens_after_expiry() {
        let mut tracker = SuppressionTracker::from_minutes(10);
        assert!(!tracker.should_suppress(1, at(0)));
        assert!(!tracker.should_suppress(1, at(11)));
        assert!(tracker.should_suppress(1, at(12)));
    }

    #[test]
    fn windows_are_independent_per_event_type() {
        let mut tracker = SuppressionTracker::from_minutes(10);
        assert!(!tracker.should_suppress(1, at(0)));
        assert!(!tracker.should_suppress(2, at(1)));
        assert!(tracker.should_suppress(1, at(2)));
        assert!(tracker.should_suppress(2, at(2)));
    }

    #[test]
    fn expired_windows_are_pruned_on_the_next_miss() {
        let mut tracker = SuppressionTracker::from_minutes(10);
        tracker.should_suppress(1, at(0));
        tracker.should_suppress(2, at(1));
        assert_eq!(tracker.tracked_types(), 2);

        // Both windows have lapsed; the next lookup sweeps them out.
        assert!(!tracker.should_suppress(3, at(30)));
        assert_eq!(tracker.tracked_types(), 1);
    }
}
