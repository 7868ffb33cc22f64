//! Wall-clock input supplied by the host's RTC.
//!
//! The core never reads a clock itself; the host passes a [`DateTime`] into
//! every `update` call.

use core::fmt::Display;

/// Calendar date and time of day, at minute resolution.
///
/// `year` is only consumed by [`SessionLog`](crate::storage::SessionLog) for
/// duration math and is never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime {
    /// Full year, e.g. 2024
    pub year: u16,
    /// Month of the year, 1..=12
    pub month: u8,
    /// Day of the month, 1..=31
    pub day: u8,
    /// Hour of the day, 0..=23
    pub hour: u8,
    /// Minute of the hour, 0..=59
    pub minute: u8,
}

impl DateTime {
    pub const fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
        }
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}

/// Returns true for Gregorian leap years.
pub const fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` of `year`, or 0 for an invalid month.
pub const fn days_in_month(year: i64, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Days since 1970-01-01 for a civil date.
///
/// Out-of-range days and months are not rejected; they are folded into the
/// count the same way a `mktime`-style conversion would.
pub fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let (m, d) = (month as i64, day as i64);
    let y = if m <= 2 { year - 1 } else { year };
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let mp = (m + 9) % 12;
    let doy = (153 * mp + 2) / 5 + d - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Minutes since 1970-01-01 00:00 for the given civil date and time.
pub fn minutes_since_epoch(year: i64, month: u8, day: u8, hour: u8, minute: u8) -> i64 {
    days_from_civil(year, month, day) * 24 * 60 + hour as i64 * 60 + minute as i64
}
