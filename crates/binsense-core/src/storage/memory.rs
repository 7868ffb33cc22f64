use thiserror_no_std::Error;

use super::ByteStore;

/// Value of an erased EEPROM cell
pub const ERASED_BYTE: u8 = 0xFF;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("Offset {offset} is outside the {capacity} byte image")]
    OutOfRange { offset: usize, capacity: usize },
}

/// RAM-backed byte store.
///
/// Starts erased (`0xFF`) like a fresh EEPROM and counts byte writes so wear
/// can be checked. Building a new store from [`as_bytes`](Self::as_bytes)
/// models a power cycle.
#[derive(Debug, Clone)]
pub struct MemoryStore<const N: usize> {
    bytes: [u8; N],
    writes: usize,
}

impl<const N: usize> MemoryStore<N> {
    pub const fn new() -> Self {
        Self {
            bytes: [ERASED_BYTE; N],
            writes: 0,
        }
    }

    pub const fn from_bytes(bytes: [u8; N]) -> Self {
        Self { bytes, writes: 0 }
    }

    pub fn as_bytes(&self) -> &[u8; N] {
        &self.bytes
    }

    /// Byte writes since creation or the last [`reset_writes`](Self::reset_writes)
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn reset_writes(&mut self) {
        self.writes = 0;
    }

    fn slot(&mut self, offset: usize) -> Result<&mut u8, MemoryStoreError> {
        self.bytes
            .get_mut(offset)
            .ok_or(MemoryStoreError::OutOfRange {
                offset,
                capacity: N,
            })
    }
}

impl<const N: usize> Default for MemoryStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteStore for MemoryStore<N> {
    type Error = MemoryStoreError;

    fn capacity(&self) -> usize {
        N
    }

    fn read_byte(&mut self, offset: usize) -> Result<u8, MemoryStoreError> {
        self.slot(offset).map(|b| *b)
    }

    fn write_byte(&mut self, offset: usize, byte: u8) -> Result<(), MemoryStoreError> {
        *self.slot(offset)? = byte;
        self.writes += 1;
        Ok(())
    }
}
