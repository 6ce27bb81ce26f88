//! Time source used by services.
//!
//! Services never read the system clock directly so tests can pin "now".

use chrono::{Local, NaiveDate, Utc};

/// Provides the current instant and the caller's calendar day.
pub trait Clock {
    /// Current instant as Unix epoch milliseconds.
    fn now_ms(&self) -> i64;
    /// Current local calendar date.
    fn today(&self) -> NaiveDate;
}

/// Wall clock. `today` uses the process local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a fixed instant and date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    pub now_ms: i64,
    pub today: NaiveDate,
}

impl FixedClock {
    pub fn new(now_ms: i64, today: NaiveDate) -> Self {
        Self { now_ms, today }
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.now_ms
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}
