//! Persisted record types.

use core::fmt::Display;

use super::codec::Record;
use crate::time::DateTime;

/// Usage counters for one day of the month.
///
/// Binary format (8 bytes, little-endian):
/// - day: 1 byte
/// - month: 1 byte
/// - count_a: 2 bytes
/// - count_b: 2 bytes
/// - count_lid: 2 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DayRecord {
    pub day: u8,
    pub month: u8,
    pub count_a: u16,
    pub count_b: u16,
    pub count_lid: u16,
}

impl DayRecord {
    /// Zeroed counters stamped with the given date.
    pub const fn new(day: u8, month: u8) -> Self {
        Self {
            day,
            month,
            count_a: 0,
            count_b: 0,
            count_lid: 0,
        }
    }

    pub fn is_for(&self, date: &DateTime) -> bool {
        self.day == date.day && self.month == date.month
    }
}

impl Record for DayRecord {
    const SIZE: usize = 8;
    type Bytes = [u8; 8];

    fn to_bytes(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        bytes[0] = self.day;
        bytes[1] = self.month;
        bytes[2..4].copy_from_slice(&self.count_a.to_le_bytes());
        bytes[4..6].copy_from_slice(&self.count_b.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.count_lid.to_le_bytes());
        bytes
    }

    fn from_bytes(bytes: &[u8; 8]) -> Self {
        Self {
            day: bytes[0],
            month: bytes[1],
            count_a: u16::from_le_bytes([bytes[2], bytes[3]]),
            count_b: u16::from_le_bytes([bytes[4], bytes[5]]),
            count_lid: u16::from_le_bytes([bytes[6], bytes[7]]),
        }
    }
}

impl Display for DayRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:02}/{:02}: {} {} {}",
            self.day, self.month, self.count_a, self.count_b, self.count_lid
        )
    }
}

/// Wall-clock mark at minute resolution. The year is not stored.
///
/// Binary format (4 bytes): day, month, hour, minute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeMark {
    pub day: u8,
    pub month: u8,
    pub hour: u8,
    pub minute: u8,
}

impl TimeMark {
    pub const fn new(day: u8, month: u8, hour: u8, minute: u8) -> Self {
        Self {
            day,
            month,
            hour,
            minute,
        }
    }

    pub fn matches(&self, now: &DateTime) -> bool {
        self.minute == now.minute
            && self.hour == now.hour
            && self.day == now.day
            && self.month == now.month
    }

    fn write_into(&self, bytes: &mut [u8]) {
        bytes[0] = self.day;
        bytes[1] = self.month;
        bytes[2] = self.hour;
        bytes[3] = self.minute;
    }

    fn read_from(bytes: &[u8]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }
}

impl From<&DateTime> for TimeMark {
    fn from(now: &DateTime) -> Self {
        Self::new(now.day, now.month, now.hour, now.minute)
    }
}

impl Display for TimeMark {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{:02}:{:02} {:02}/{:02}",
            self.hour, self.minute, self.day, self.month
        )
    }
}

/// Start and stop of the current power-on session.
///
/// Binary format (8 bytes): start mark, stop mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionRecord {
    pub start: TimeMark,
    pub stop: TimeMark,
}

impl Record for SessionRecord {
    const SIZE: usize = 8;
    type Bytes = [u8; 8];

    fn to_bytes(&self) -> [u8; 8] {
        let mut bytes = [0u8; 8];
        self.start.write_into(&mut bytes[0..4]);
        self.stop.write_into(&mut bytes[4..8]);
        bytes
    }

    fn from_bytes(bytes: &[u8; 8]) -> Self {
        Self {
            start: TimeMark::read_from(&bytes[0..4]),
            stop: TimeMark::read_from(&bytes[4..8]),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::string::ToString;

    use super::*;

    #[test]
    fn test_day_record_display() {
        let record = DayRecord {
            day: 3,
            month: 11,
            count_a: 42,
            count_b: 0,
            count_lid: 1200,
        };
        assert_eq!(record.to_string(), "03/11: 42 0 1200");
    }

    #[test]
    fn test_time_mark_display() {
        assert_eq!(TimeMark::new(9, 1, 7, 5).to_string(), "07:05 09/01");
    }

    #[test]
    fn test_session_record_layout() {
        let record = SessionRecord {
            start: TimeMark::new(1, 2, 3, 4),
            stop: TimeMark::new(5, 6, 7, 8),
        };
        assert_eq!(record.to_bytes(), [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_time_mark_matches_ignores_year() {
        let mark = TimeMark::new(31, 12, 23, 59);
        assert!(mark.matches(&DateTime::new(2023, 12, 31, 23, 59)));
        assert!(mark.matches(&DateTime::new(2024, 12, 31, 23, 59)));
        assert!(!mark.matches(&DateTime::new(2024, 12, 31, 23, 58)));
    }

    #[test]
    fn test_day_record_is_for() {
        let record = DayRecord::new(15, 6);
        assert!(record.is_for(&DateTime::new(2024, 6, 15, 0, 0)));
        assert!(!record.is_for(&DateTime::new(2024, 7, 15, 0, 0)));
    }
}
