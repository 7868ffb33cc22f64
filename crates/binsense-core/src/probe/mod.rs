//! Distance probes
//!
//! A probe produces one distance reading per call in the unit it was
//! configured with. The detector consumes readings; it never drives pins.

mod hcsr04;

pub use hcsr04::{ECHO_TIMEOUT_US, Hcsr04};

use thiserror_no_std::Error;

use crate::config::DistanceUnit;

/// One probe measurement.
///
/// `NoEcho` keeps a missing echo apart from a genuine max-range reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    Distance(u32),
    NoEcho,
}

impl Reading {
    /// Distance to feed the detector. No echo reads as `max_distance`.
    pub fn or_max(self, max_distance: u32) -> u32 {
        match self {
            Self::Distance(d) => d.min(max_distance),
            Self::NoEcho => max_distance,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Pin access failed while trying to {operation}")]
    Pin { operation: &'static str },
}

/// Trait for anything that can measure a distance.
pub trait DistanceProbe {
    type Error: core::fmt::Debug;

    /// Take one measurement. May block for the echo round trip.
    fn measure(&mut self) -> Result<Reading, Self::Error>;

    /// Unit the readings are reported in.
    fn unit(&self) -> DistanceUnit;
}

impl<P: DistanceProbe> DistanceProbe for &mut P {
    type Error = P::Error;

    fn measure(&mut self) -> Result<Reading, Self::Error> {
        (**self).measure()
    }

    fn unit(&self) -> DistanceUnit {
        (**self).unit()
    }
}
