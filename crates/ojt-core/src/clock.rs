//! Injectable source of the current instant.

use chrono::{DateTime, FixedOffset, Local, NaiveDate};

/// Supplies "now" to code that would otherwise reach for the system clock.
pub trait Clock: Send + Sync {
    /// The current instant, carrying the offset of the user's local time.
    fn now(&self) -> DateTime<FixedOffset>;

    /// The local calendar date of [`Clock::now`].
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Reads the operating system clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
