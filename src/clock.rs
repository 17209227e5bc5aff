//! Reference clock abstraction.
//!
//! Eligibility and streak logic hinge on "today" in local wall-clock time.
//! The clock is an injected dependency so tests can pin the current instant
//! instead of depending on when they run.

use chrono::{DateTime, Local, NaiveDate};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Current instant in local time.
    fn now(&self) -> DateTime<Local>;

    /// Today's calendar date in local time.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock implementation used by the server.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
pub(crate) mod fixed {
    use super::*;

    /// Clock pinned to a single instant, for deterministic tests.
    pub struct FixedClock(pub DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixed::FixedClock;
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn today_is_the_calendar_date_of_now() {
        let clock = FixedClock(Local.with_ymd_and_hms(2024, 3, 5, 23, 59, 59).unwrap());
        assert_eq!(
            clock.today(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
    }
}
