//! EEPROM image backed by a file on the host.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use binsense_core::ByteStore;
use binsense_core::storage::memory::ERASED_BYTE;
use log::{debug, info};
use thiserror_no_std::Error;

#[derive(Error, Debug)]
pub enum FileStoreError {
    #[error("Offset {offset} is outside the {capacity} byte image")]
    OutOfRange { offset: usize, capacity: usize },
}

/// Byte store held in RAM and written back to its file on [`flush`](Self::flush).
///
/// A missing file, or one of the wrong size, starts out as an erased image.
pub struct FileStore {
    path: PathBuf,
    bytes: Vec<u8>,
    dirty: bool,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>, capacity: usize) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let bytes = match fs::read(&path) {
            Ok(bytes) if bytes.len() == capacity => {
                info!("Loaded EEPROM image {}", path.display());
                bytes
            }
            Ok(bytes) => {
                info!(
                    "EEPROM image {} is {} bytes, expected {}; starting erased",
                    path.display(),
                    bytes.len(),
                    capacity
                );
                vec![ERASED_BYTE; capacity]
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No EEPROM image at {}; starting erased", path.display());
                vec![ERASED_BYTE; capacity]
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            path,
            bytes,
            dirty: false,
        })
    }

    /// Write the image back if any byte changed.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.dirty {
            fs::write(&self.path, &self.bytes)?;
            self.dirty = false;
            debug!("Flushed EEPROM image to {}", self.path.display());
        }
        Ok(())
    }
}

impl ByteStore for FileStore {
    type Error = FileStoreError;

    fn capacity(&self) -> usize {
        self.bytes.len()
    }

    fn read_byte(&mut self, offset: usize) -> Result<u8, FileStoreError> {
        self.bytes
            .get(offset)
            .copied()
            .ok_or(FileStoreError::OutOfRange {
                offset,
                capacity: self.bytes.len(),
            })
    }

    fn write_byte(&mut self, offset: usize, byte: u8) -> Result<(), FileStoreError> {
        let capacity = self.bytes.len();
        let slot = self
            .bytes
            .get_mut(offset)
            .ok_or(FileStoreError::OutOfRange { offset, capacity })?;
        if *slot != byte {
            *slot = byte;
            self.dirty = true;
        }
        Ok(())
    }
}
