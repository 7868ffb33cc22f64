//! Hardware-independent core library for binsense
//!
//! This crate contains the platform-agnostic logic of the bin-monitoring
//! device: the debounced deposit detector, the distance probe abstraction
//! (with an HC-SR04 driver over `embedded-hal`), and the EEPROM-backed
//! session and daily usage stores.
//!
//! It is `#![no_std]` so it compiles on both embedded targets and desktop
//! hosts (for the simulator and tests).

#![no_std]

pub mod config;
pub mod detector;
pub mod probe;
pub mod storage;
pub mod time;

pub use config::{DeviceConfig, DistanceUnit, HitDetectorConfig, StoreLayout};
pub use detector::HitDetector;
pub use probe::{DistanceProbe, Reading};
pub use storage::{ByteStore, DailyStatsStore, MemoryStore, SessionLog, StoreError};
pub use time::DateTime;
