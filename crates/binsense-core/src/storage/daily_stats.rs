//! Day-of-month usage statistics
//!
//! Keeps one [`DayRecord`] per day-of-month slot on the medium. Only the
//! current day's record lives in RAM; counter setters just mark it dirty
//! and the next [`update`](DailyStatsStore::update) writes it out. A slot is
//! overwritten in place when its day comes round again the next month.

use core::fmt::Write;

use heapless::String;
use log::{debug, info, warn};

use super::codec::{Record, read_record, write_record};
use super::records::DayRecord;
use super::{
    ByteStore, STATS_SIGNATURE, STATS_SLOT_COUNT, StoreError, has_signature, write_signature,
};
use crate::time::DateTime;

/// Capacity of a rendered history line
pub const HISTORY_TEXT_LEN: usize = 32;

pub struct DailyStatsStore<S> {
    store: S,
    offset: usize,
    record: DayRecord,
    dirty: bool,
}

impl<S: ByteStore> DailyStatsStore<S> {
    /// `offset` is where the signature byte lives; slots follow it.
    pub fn new(store: S, offset: usize) -> Self {
        Self {
            store,
            offset,
            record: DayRecord::default(),
            dirty: false,
        }
    }

    /// Load today's slot, or seed every slot on a blank medium.
    ///
    /// Returns true when the store was already initialised. A slot left
    /// over from an earlier month is reseeded for today and written on the
    /// next [`update`](Self::update).
    pub fn begin(&mut self, now: &DateTime) -> Result<bool, StoreError<S::Error>> {
        self.dirty = false;

        if has_signature(&mut self.store, self.offset, STATS_SIGNATURE)? {
            self.record = match self.read_slot(now.day)? {
                Some(record) if record.month == now.month => record,
                Some(record) => {
                    warn!(
                        "Day {} slot holds month {}, reseeding for month {}",
                        now.day, record.month, now.month
                    );
                    self.dirty = true;
                    DayRecord::new(now.day, now.month)
                }
                None => DayRecord::new(now.day, now.month),
            };
            info!("Daily stats resumed: {}", self.record);
            return Ok(true);
        }

        for day in 0..STATS_SLOT_COUNT as u8 {
            self.write_slot(&DayRecord::new(day, now.month))?;
        }
        self.record = DayRecord::new(now.day, now.month);
        write_signature(&mut self.store, self.offset, STATS_SIGNATURE)?;
        info!(
            "Daily stats initialised: {} slots for month {}",
            STATS_SLOT_COUNT, now.month
        );
        Ok(false)
    }

    /// Flush on day change or pending counter changes.
    ///
    /// A new day first writes out the previous day's record, then starts a
    /// zeroed record for the new day and writes that too. Returns true when
    /// anything was written.
    pub fn update(&mut self, now: &DateTime) -> Result<bool, StoreError<S::Error>> {
        let mut wrote = false;

        if !self.record.is_for(now) {
            let closing = self.record;
            info!("Day rollover: closing {}", closing);
            wrote |= self.write_slot(&closing)?;
            self.record = DayRecord::new(now.day, now.month);
            self.dirty = true;
        }

        if self.dirty {
            let current = self.record;
            wrote |= self.write_slot(&current)?;
            self.dirty = false;
        }

        Ok(wrote)
    }

    pub fn set_counter_a(&mut self, value: u16) {
        self.record.count_a = value;
        self.dirty = true;
    }

    pub fn set_counter_b(&mut self, value: u16) {
        self.record.count_b = value;
        self.dirty = true;
    }

    pub fn set_counter_lid(&mut self, value: u16) {
        self.record.count_lid = value;
        self.dirty = true;
    }

    /// Today's in-memory record
    pub fn record(&self) -> &DayRecord {
        &self.record
    }

    /// True when counters changed since the last flush
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Read a slot straight from the medium, bypassing today's record.
    ///
    /// `None` for days outside the slot window.
    pub fn history(&mut self, day: u8) -> Result<Option<DayRecord>, StoreError<S::Error>> {
        self.read_slot(day)
    }

    /// Render a slot as `DD/MM: A B LID`.
    pub fn print_history(
        &mut self,
        day: u8,
    ) -> Result<Option<String<HISTORY_TEXT_LEN>>, StoreError<S::Error>> {
        Ok(self.read_slot(day)?.map(|record| {
            let mut text = String::new();
            // The widest line is 25 chars
            let written = write!(text, "{}", record);
            debug_assert!(written.is_ok());
            text
        }))
    }

    /// Hand back the underlying store.
    pub fn into_inner(self) -> S {
        self.store
    }

    fn slot_offset(&self, day: u8) -> Option<usize> {
        let index = day as usize;
        (index < STATS_SLOT_COUNT).then(|| self.offset + 1 + index * DayRecord::SIZE)
    }

    fn read_slot(&mut self, day: u8) -> Result<Option<DayRecord>, StoreError<S::Error>> {
        let Some(position) = self.slot_offset(day) else {
            warn!("Ignoring read of day {}: no such slot", day);
            return Ok(None);
        };

        let mut record: DayRecord = read_record(&mut self.store, position)?;
        record.day = day;
        Ok(Some(record))
    }

    fn write_slot(&mut self, record: &DayRecord) -> Result<bool, StoreError<S::Error>> {
        let Some(position) = self.slot_offset(record.day) else {
            warn!("Ignoring write of day {}: no such slot", record.day);
            return Ok(false);
        };

        write_record(&mut self.store, position, record)?;
        debug!("Wrote {} at offset {}", record, position);
        Ok(true)
    }
}
