//! Device configuration
//!
//! Replaces the pin/EEPROM globals of a typical sketch with explicit values
//! handed to each component at construction.

use core::ops::Range;

use serde::{Deserialize, Serialize};
use thiserror_no_std::Error;

use crate::storage::{SESSION_STORE_SIZE, STATS_STORE_SIZE};

/// Unit a distance probe reports in. Chosen once at configuration time.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceUnit {
    #[default]
    Centimeters,
    Inches,
}

impl DistanceUnit {
    /// Convert an ultrasonic round-trip pulse width to a one-way distance.
    ///
    /// Sound travels roughly 29 µs per centimeter and 74 µs per inch; the
    /// pulse covers the distance twice.
    pub const fn from_echo_micros(self, micros: u32) -> u32 {
        match self {
            Self::Centimeters => micros / 29 / 2,
            Self::Inches => micros / 74 / 2,
        }
    }

    /// Short label for display
    pub const fn label(self) -> &'static str {
        match self {
            Self::Centimeters => "cm",
            Self::Inches => "in",
        }
    }
}

/// Tuning for [`HitDetector`](crate::detector::HitDetector).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitDetectorConfig {
    /// Readings above this are clamped to it
    pub max_distance: u32,
    /// A sample must come closer than the previous one by more than this to count
    pub difference_threshold: u32,
    /// Number of `sample` calls suppressed after a hit
    pub max_timeout_ticks: u8,
    /// Largest value the event counter holds before wrapping to 0
    pub max_counter: u32,
    pub unit: DistanceUnit,
}

impl Default for HitDetectorConfig {
    fn default() -> Self {
        Self {
            max_distance: 50,
            difference_threshold: 10,
            max_timeout_ticks: 3,
            max_counter: 9999,
            unit: DistanceUnit::Centimeters,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("session window {session:?} overlaps stats window {stats:?}")]
    Overlap {
        session: Range<usize>,
        stats: Range<usize>,
    },
    #[error("layout needs {required} bytes but the medium holds {capacity}")]
    TooSmall { required: usize, capacity: usize },
}

/// Byte offsets of each persistent store on the shared medium.
///
/// Both stores write a signature byte at their offset followed by their
/// records. The windows must not overlap; nothing at runtime arbitrates
/// between them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLayout {
    pub session_offset: usize,
    pub stats_offset: usize,
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            session_offset: 0,
            stats_offset: 16,
        }
    }
}

impl StoreLayout {
    pub const fn session_window(&self) -> Range<usize> {
        self.session_offset..self.session_offset + SESSION_STORE_SIZE
    }

    pub const fn stats_window(&self) -> Range<usize> {
        self.stats_offset..self.stats_offset + STATS_STORE_SIZE
    }

    /// Smallest medium that holds both windows
    pub fn required_capacity(&self) -> usize {
        self.session_window().end.max(self.stats_window().end)
    }

    /// Check the windows are disjoint and fit on a medium of `capacity` bytes.
    pub fn validate(&self, capacity: usize) -> Result<(), LayoutError> {
        let session = self.session_window();
        let stats = self.stats_window();
        if session.start < stats.end && stats.start < session.end {
            return Err(LayoutError::Overlap { session, stats });
        }

        let required = self.required_capacity();
        if required > capacity {
            return Err(LayoutError::TooSmall { required, capacity });
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceConfig {
    pub detector: HitDetectorConfig,
    pub layout: StoreLayout,
}
