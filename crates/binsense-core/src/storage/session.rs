//! Power-on session log
//!
//! Persists when the current session started and when the clock was last
//! seen, so the previous session's span survives a reset.

use core::fmt::Write;

use heapless::String;
use log::{debug, info};

use super::codec::{read_record, write_record};
use super::records::{SessionRecord, TimeMark};
use super::{ByteStore, SESSION_SIGNATURE, StoreError, has_signature, write_signature};
use crate::time::{DateTime, minutes_since_epoch};

/// Capacity of a rendered [`TimeMark`]
pub const TIME_TEXT_LEN: usize = 16;

/// Render a mark as `HH:MM DD/MM`.
pub fn print_time(mark: &TimeMark) -> String<TIME_TEXT_LEN> {
    let mut text = String::new();
    // Four u8 fields render to at most 15 chars
    let written = write!(text, "{}", mark);
    debug_assert!(written.is_ok());
    text
}

pub struct SessionLog<S> {
    store: S,
    offset: usize,
    record: SessionRecord,
    first_tick: bool,
    /// Year seen on the first tick of this boot. Volatile only.
    year: Option<u16>,
}

impl<S: ByteStore> SessionLog<S> {
    /// `offset` is where the signature byte lives; the record follows it.
    pub fn new(store: S, offset: usize) -> Self {
        Self {
            store,
            offset,
            record: SessionRecord::default(),
            first_tick: true,
            year: None,
        }
    }

    /// Load the persisted record, or initialise a blank medium.
    ///
    /// Returns true when a previous session was found.
    pub fn begin(&mut self) -> Result<bool, StoreError<S::Error>> {
        self.first_tick = true;
        self.year = None;

        if has_signature(&mut self.store, self.offset, SESSION_SIGNATURE)? {
            self.record = read_record(&mut self.store, self.offset + 1)?;
            info!(
                "Session log resumed, last session {} to {}",
                self.record.start, self.record.stop
            );
            return Ok(true);
        }

        self.record = SessionRecord::default();
        write_record(&mut self.store, self.offset + 1, &self.record)?;
        write_signature(&mut self.store, self.offset, SESSION_SIGNATURE)?;
        info!("Session log initialised at offset {}", self.offset);
        Ok(false)
    }

    /// Record a clock tick. Writes only when the minute has changed.
    ///
    /// The first changed tick after [`begin`](Self::begin) also stamps the
    /// session start and captures the year for [`duration_minutes`](Self::duration_minutes).
    pub fn update(&mut self, now: &DateTime) -> Result<bool, StoreError<S::Error>> {
        if self.record.stop.matches(now) {
            return Ok(false);
        }

        let mark = TimeMark::from(now);
        self.record.stop = mark;
        if self.first_tick {
            self.record.start = mark;
            self.year = Some(now.year);
            self.first_tick = false;
            debug!("Session started at {}", mark);
        }

        write_record(&mut self.store, self.offset + 1, &self.record)?;
        Ok(true)
    }

    /// Minutes from start to stop, using the year captured this boot.
    ///
    /// `None` until the first tick has been recorded. There is no
    /// cross-year correction: a span that crosses new year within one boot
    /// comes out negative and is reported as 0.
    pub fn duration_minutes(&self) -> Option<u32> {
        let year = self.year? as i64;
        let minutes = |m: &TimeMark| minutes_since_epoch(year, m.month, m.day, m.hour, m.minute);
        let span = minutes(&self.record.stop) - minutes(&self.record.start);
        Some(span.clamp(0, u32::MAX as i64) as u32)
    }

    pub fn start(&self) -> &TimeMark {
        &self.record.start
    }

    pub fn stop(&self) -> &TimeMark {
        &self.record.stop
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    /// Hand back the underlying store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SESSION_STORE_SIZE};

    type Store = MemoryStore<32>;

    fn at(year: u16, month: u8, day: u8, hour: u8, minute: u8) -> DateTime {
        DateTime::new(year, month, day, hour, minute)
    }

    #[test]
    fn test_first_run_then_resume() {
        let mut log = SessionLog::new(Store::new(), 4);
        assert!(!log.begin().unwrap());
        let store = log.into_inner();
        assert_eq!(store.as_bytes()[4], SESSION_SIGNATURE);
        assert_eq!(&store.as_bytes()[5..13], &[0; 8]);
        assert_eq!(store.writes(), SESSION_STORE_SIZE);

        for _ in 0..3 {
            let mut log = SessionLog::new(store.clone(), 4);
            assert!(log.begin().unwrap());
        }
    }

    #[test]
    fn test_first_tick_stamps_start_and_stop() {
        let mut log = SessionLog::new(Store::new(), 0);
        log.begin().unwrap();

        assert!(log.update(&at(2024, 6, 15, 8, 30)).unwrap());
        assert_eq!(*log.start(), TimeMark::new(15, 6, 8, 30));
        assert_eq!(*log.stop(), TimeMark::new(15, 6, 8, 30));

        assert!(log.update(&at(2024, 6, 15, 9, 45)).unwrap());
        assert_eq!(*log.start(), TimeMark::new(15, 6, 8, 30));
        assert_eq!(*log.stop(), TimeMark::new(15, 6, 9, 45));
        assert_eq!(log.duration_minutes(), Some(75));
    }

    #[test]
    fn test_same_minute_writes_nothing() {
        let mut store = Store::new();
        let mut log = SessionLog::new(&mut store, 0);
        log.begin().unwrap();
        log.update(&at(2024, 6, 15, 8, 30)).unwrap();
        drop(log);
        store.reset_writes();

        let mut log = SessionLog::new(&mut store, 0);
        log.begin().unwrap();
        // Stored stop matches, so this tick is not a change
        assert!(!log.update(&at(2024, 6, 15, 8, 30)).unwrap());
        assert!(!log.update(&at(2024, 6, 15, 8, 30)).unwrap());
        drop(log);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn test_resume_restarts_session_on_new_minute() {
        let mut store = Store::new();
        {
            let mut log = SessionLog::new(&mut store, 0);
            log.begin().unwrap();
            log.update(&at(2024, 6, 15, 8, 0)).unwrap();
            log.update(&at(2024, 6, 15, 10, 0)).unwrap();
        }

        let mut log = SessionLog::new(&mut store, 0);
        assert!(log.begin().unwrap());
        // Previous session is visible until the first tick
        assert_eq!(*log.start(), TimeMark::new(15, 6, 8, 0));
        assert_eq!(*log.stop(), TimeMark::new(15, 6, 10, 0));
        assert_eq!(log.duration_minutes(), None);

        assert!(log.update(&at(2024, 6, 16, 7, 0)).unwrap());
        assert_eq!(*log.start(), TimeMark::new(16, 6, 7, 0));
        assert_eq!(log.duration_minutes(), Some(0));
    }

    #[test]
    fn test_duration_across_month_end() {
        let mut log = SessionLog::new(Store::new(), 0);
        log.begin().unwrap();
        log.update(&at(2024, 2, 28, 23, 0)).unwrap();
        log.update(&at(2024, 3, 1, 1, 0)).unwrap();
        // 2024 is a leap year: 28th 23:00 -> 1st 01:00 is 26 hours
        assert_eq!(log.duration_minutes(), Some(26 * 60));
    }

    #[test]
    fn test_duration_across_new_year_is_not_corrected() {
        let mut log = SessionLog::new(Store::new(), 0);
        log.begin().unwrap();
        log.update(&at(2023, 12, 31, 23, 50)).unwrap();
        log.update(&at(2024, 1, 1, 0, 10)).unwrap();
        assert_eq!(log.duration_minutes(), Some(0));
    }

    #[test]
    fn test_print_time() {
        let text = print_time(&TimeMark::new(5, 12, 9, 3));
        assert_eq!(text.as_str(), "09:03 05/12");

        // Widest possible rendering still fits
        let text = print_time(&TimeMark::new(255, 255, 255, 255));
        assert_eq!(text.as_str(), "255:255 255/255");
    }

    #[test]
    fn test_window_past_end_is_an_error() {
        let mut log = SessionLog::new(Store::new(), 30);
        assert!(matches!(
            log.begin(),
            Err(StoreError::OutOfBounds { .. })
        ));
    }
}
