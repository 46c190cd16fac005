//! Time helpers - business timezone conversion

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Calendar date of an instant in the business timezone
pub fn business_date(at: DateTime<Utc>, tz: Tz) -> NaiveDate {
    at.with_timezone(&tz).date_naive()
}

/// `HH:MM` in the business timezone, used to stamp appended notes
pub fn clock_stamp(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%H:%M").to_string()
}

/// Whole days from `start` to `end`, floored, never negative
pub fn whole_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    (end - start).num_days().max(0)
}
