//! Wall-clock access for the timer.
//!
//! The timer only needs the current timestamp (for completed-task records)
//! and a calendar-day identifier (for today's focus-time rollover).

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, Utc};

/// Format of calendar-day identifiers.
const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the calendar-day identifier (`YYYY-MM-DD`) of `at`.
    ///
    /// The default implementation uses the local timezone.
    fn day_key(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&Local).format(DAY_KEY_FORMAT).to_string()
    }

    /// Returns the calendar-day identifier of the current time.
    fn today(&self) -> String {
        self.day_key(self.now())
    }
}

/// Clock backed by the system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for tests.
///
/// Day keys are computed in UTC so results do not depend on the host
/// timezone.
#[derive(Debug)]
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
}

impl MockClock {
    /// Creates a clock frozen at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard += by;
        }
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|guard| *guard).unwrap_or_else(|_| Utc::now())
    }

    fn day_key(&self, at: DateTime<Utc>) -> String {
        at.format(DAY_KEY_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_mock_clock_day_key() {
        let clock = MockClock::new(at(2026, 10, 16, 9));
        assert_eq!(clock.today(), "2026-10-16");
    }

    #[test]
    fn test_mock_clock_advance_crosses_midnight() {
        let clock = MockClock::new(at(2026, 10, 16, 23));
        clock.advance(Duration::hours(2));
        assert_eq!(clock.today(), "2026-10-17");
    }

    #[test]
    fn test_system_clock_day_key_format() {
        let key = SystemClock.today();
        assert_eq!(key.len(), 10);
        assert_eq!(&key[4..5], "-");
        assert_eq!(&key[7..8], "-");
    }
}
