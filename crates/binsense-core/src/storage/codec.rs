//! Fixed-size record serialization onto a [`ByteStore`].
//!
//! Records encode field by field in declaration order; multi-byte fields
//! are little-endian. The layout therefore does not depend on in-memory
//! struct padding and round-trips exactly.

use super::{ByteStore, StoreError, check_bounds};

/// Plain record with a fixed encoded size.
pub trait Record: Sized {
    /// Encoded size in bytes
    const SIZE: usize;

    /// Byte array holding exactly `SIZE` bytes
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    fn to_bytes(&self) -> Self::Bytes;

    fn from_bytes(bytes: &Self::Bytes) -> Self;
}

/// Write `record` at `offset`, one byte at a time.
///
/// The whole range is bounds-checked before the first byte is written.
pub fn write_record<S: ByteStore, R: Record>(
    store: &mut S,
    offset: usize,
    record: &R,
) -> Result<(), StoreError<S::Error>> {
    check_bounds(store, offset, R::SIZE)?;

    let bytes = record.to_bytes();
    for (i, &byte) in bytes.as_ref().iter().enumerate() {
        store
            .write_byte(offset + i, byte)
            .map_err(StoreError::Medium)?;
    }
    Ok(())
}

/// Read a record previously written at `offset`.
pub fn read_record<S: ByteStore, R: Record>(
    store: &mut S,
    offset: usize,
) -> Result<R, StoreError<S::Error>> {
    check_bounds(store, offset, R::SIZE)?;

    let mut bytes = R::Bytes::default();
    for (i, byte) in bytes.as_mut().iter_mut().enumerate() {
        *byte = store.read_byte(offset + i).map_err(StoreError::Medium)?;
    }
    Ok(R::from_bytes(&bytes))
}
