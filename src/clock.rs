//! Calendar source for rollover and journal timestamps

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use std::sync::{Arc, Mutex};

use crate::config::DayBoundary;

/// Supplies "now" and the calendar date that counts as today
pub trait Clock: Send {
    /// Calendar date used for rollover
    fn today(&self) -> NaiveDate;

    /// Current instant, used for journal timestamps and ids
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock. The day boundary is either device-local midnight or UTC.
///
/// Local dates follow whatever the OS timezone says at call time, so
/// travelling across zones or a DST shift can move the boundary.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    boundary: DayBoundary,
}

impl SystemClock {
    pub fn new(boundary: DayBoundary) -> Self {
        Self { boundary }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(DayBoundary::Local)
    }
}

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        match self.boundary {
            DayBoundary::Local => Local::now().date_naive(),
            DayBoundary::Utc => Utc::now().date_naive(),
        }
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Noon UTC on the given date
    pub fn on(date: NaiveDate) -> Self {
        Self::at(noon_utc(date))
    }

    pub fn set_date(&self, date: NaiveDate) {
        self.set(noon_utc(date));
    }

    pub fn set(&self, now: DateTime<Utc>) {
        match self.now.lock() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }

    pub fn advance_days(&self, days: i64) {
        self.set(self.now() + chrono::Duration::days(days));
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

fn noon_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
        + chrono::Duration::hours(12)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_shared_between_clones() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        let clock = FixedClock::on(date);
        let view = clock.clone();

        clock.advance_days(2);
        assert_eq!(view.today(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());

        clock.set_date(date);
        assert_eq!(view.today(), date);
    }

    #[test]
    fn test_utc_clock_matches_utc_date() {
        let clock = SystemClock::new(DayBoundary::Utc);
        let before = Utc::now().date_naive();
        let today = clock.today();
        let after = Utc::now().date_naive();
        assert!(today == before || today == after);
    }
}
