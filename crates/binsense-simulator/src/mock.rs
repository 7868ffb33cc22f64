//! Synthetic hardware for the simulator.

use binsense_core::time::days_in_month;
use binsense_core::{DateTime, DistanceProbe, DistanceUnit, Reading};

/// Ultrasonic probe looking down into a bin.
///
/// Reads the floor distance with a little noise, shows a passing item every
/// `deposit_every` measurements, and now and then loses the echo.
pub struct MockProbe {
    floor: u32,
    deposit_every: u32,
    ticks: u32,
    seed: u32,
}

impl MockProbe {
    pub fn new(floor: u32, deposit_every: u32, seed: u32) -> Self {
        Self {
            floor,
            deposit_every,
            ticks: 0,
            seed,
        }
    }

    fn noise(&mut self) -> u32 {
        // Numerical Recipes LCG
        self.seed = self.seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        (self.seed >> 16) % 5
    }
}

impl DistanceProbe for MockProbe {
    type Error = core::convert::Infallible;

    fn measure(&mut self) -> Result<Reading, Self::Error> {
        self.ticks = self.ticks.wrapping_add(1);
        let noise = self.noise();

        if self.ticks % 97 == 0 {
            return Ok(Reading::NoEcho);
        }
        if self.deposit_every > 0 && self.ticks % self.deposit_every == 0 {
            return Ok(Reading::Distance(self.floor / 3 + noise));
        }
        Ok(Reading::Distance(self.floor.saturating_sub(2) + noise))
    }

    fn unit(&self) -> DistanceUnit {
        DistanceUnit::Centimeters
    }
}

/// Wall clock that moves one minute per tick.
pub struct SimClock {
    now: DateTime,
}

impl SimClock {
    pub fn new(start: DateTime) -> Self {
        Self { now: start }
    }

    pub fn now(&self) -> DateTime {
        self.now
    }

    pub fn advance_minute(&mut self) {
        let now = &mut self.now;
        now.minute += 1;
        if now.minute < 60 {
            return;
        }
        now.minute = 0;
        now.hour += 1;
        if now.hour < 24 {
            return;
        }
        now.hour = 0;
        now.day += 1;
        if now.day <= days_in_month(now.year as i64, now.month) {
            return;
        }
        now.day = 1;
        now.month += 1;
        if now.month <= 12 {
            return;
        }
        now.month = 1;
        now.year += 1;
    }
}
