//! Non-volatile storage
//!
//! The medium is a plain byte-addressable array (EEPROM on the device, a
//! file in the simulator). Each store owns a fixed window on it: one
//! signature byte followed by its records.
//!
//! ## Layout
//!
//! | Store | Bytes | Contents |
//! |-------|-------|----------|
//! | [`SessionLog`] | 1 + 8 | signature, start mark, stop mark |
//! | [`DailyStatsStore`] | 1 + 31 × 8 | signature, one [`DayRecord`] per day-of-month slot |
//!
//! Records are written one byte at a time with no checksum, so a reset in
//! the middle of a write can leave a record mixing old and new bytes.

pub mod codec;
pub mod daily_stats;
pub mod memory;
pub mod records;
pub mod session;

pub use codec::{Record, read_record, write_record};
pub use daily_stats::DailyStatsStore;
pub use memory::{MemoryStore, MemoryStoreError};
pub use records::{DayRecord, SessionRecord, TimeMark};
pub use session::{SessionLog, print_time};

use core::cell::RefCell;

use thiserror_no_std::Error;

/// Signature marking an initialised session window
pub const SESSION_SIGNATURE: u8 = 0x42;
/// Signature marking an initialised daily stats window
pub const STATS_SIGNATURE: u8 = 0x42;

/// Number of day-of-month slots in the daily stats window
pub const STATS_SLOT_COUNT: usize = 31;

/// Bytes used by a [`SessionLog`] window
pub const SESSION_STORE_SIZE: usize = 1 + SessionRecord::SIZE;
/// Bytes used by a [`DailyStatsStore`] window
pub const STATS_STORE_SIZE: usize = 1 + STATS_SLOT_COUNT * DayRecord::SIZE;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError<E> {
    #[error("Storage medium error: {0:?}")]
    Medium(E),
    #[error("Access of {len} bytes at offset {offset} exceeds capacity {capacity}")]
    OutOfBounds {
        offset: usize,
        len: usize,
        capacity: usize,
    },
}

/// Byte-addressable non-volatile medium.
///
/// Implementations own any wear leveling; the stores only minimise how
/// often they write.
pub trait ByteStore {
    type Error: core::fmt::Debug;

    /// Total addressable bytes
    fn capacity(&self) -> usize;

    fn read_byte(&mut self, offset: usize) -> Result<u8, Self::Error>;

    fn write_byte(&mut self, offset: usize, byte: u8) -> Result<(), Self::Error>;
}

impl<S: ByteStore> ByteStore for &mut S {
    type Error = S::Error;

    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn read_byte(&mut self, offset: usize) -> Result<u8, Self::Error> {
        (**self).read_byte(offset)
    }

    fn write_byte(&mut self, offset: usize, byte: u8) -> Result<(), Self::Error> {
        (**self).write_byte(offset, byte)
    }
}

/// Shares one medium between several stores on a single thread.
///
/// Each access borrows the cell for one byte only, so stores holding the
/// same `&RefCell` never overlap a borrow.
impl<S: ByteStore> ByteStore for &RefCell<S> {
    type Error = S::Error;

    fn capacity(&self) -> usize {
        self.borrow().capacity()
    }

    fn read_byte(&mut self, offset: usize) -> Result<u8, Self::Error> {
        self.borrow_mut().read_byte(offset)
    }

    fn write_byte(&mut self, offset: usize, byte: u8) -> Result<(), Self::Error> {
        self.borrow_mut().write_byte(offset, byte)
    }
}

/// Read a store's signature byte.
pub(crate) fn has_signature<S: ByteStore>(
    store: &mut S,
    offset: usize,
    signature: u8,
) -> Result<bool, StoreError<S::Error>> {
    check_bounds(store, offset, 1)?;
    let byte = store.read_byte(offset).map_err(StoreError::Medium)?;
    Ok(byte == signature)
}

pub(crate) fn write_signature<S: ByteStore>(
    store: &mut S,
    offset: usize,
    signature: u8,
) -> Result<(), StoreError<S::Error>> {
    check_bounds(store, offset, 1)?;
    store
        .write_byte(offset, signature)
        .map_err(StoreError::Medium)
}

pub(crate) fn check_bounds<S: ByteStore>(
    store: &S,
    offset: usize,
    len: usize,
) -> Result<(), StoreError<S::Error>> {
    let capacity = store.capacity();
    match offset.checked_add(len) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(StoreError::OutOfBounds {
            offset,
            len,
            capacity,
        }),
    }
}
