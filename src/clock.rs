// Wall clock abstraction so timer arithmetic is testable

use chrono::{Local, NaiveDateTime};

/// Source of "now" for timer operations.
///
/// Production code uses [`SystemClock`]; tests inject a fixed clock so
/// elapsed-minute arithmetic can be checked exactly.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock, second precision is all the duration math needs
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Settable clock for tests
#[cfg(test)]
pub struct ManualClock(pub std::cell::Cell<NaiveDateTime>);

#[cfg(test)]
impl ManualClock {
    pub fn at(now: NaiveDateTime) -> Self {
        ManualClock(std::cell::Cell::new(now))
    }

    pub fn advance_secs(&self, secs: i64) {
        self.0.set(self.0.get() + chrono::Duration::seconds(secs));
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let t0 = NaiveDateTime::parse_from_str("2024-01-15T09:00:00", "%Y-%m-%dT%H:%M:%S").unwrap();
        let clock = ManualClock::at(t0);
        assert_eq!(clock.now(), t0);

        clock.advance_secs(125);
        assert_eq!((clock.now() - t0).num_seconds(), 125);
    }

    #[test]
    fn test_system_clock_is_recent() {
        let now = SystemClock.now();
        assert!(now.and_utc().timestamp() > 1_600_000_000);
    }
}
