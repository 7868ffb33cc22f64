use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::{debug, error};

use super::{DistanceProbe, ProbeError, Reading};
use crate::config::DistanceUnit;

/// Longest echo wait in microseconds, both for the rising edge and for the
/// pulse itself. Roughly 5 m of round trip.
pub const ECHO_TIMEOUT_US: u32 = 30_000;

/// HC-SR04 ultrasonic range finder.
///
/// The echo pulse is timed by polling in 1 µs steps, so the reading is only
/// as accurate as the delay provider and the pin read latency allow.
pub struct Hcsr04<T, E, D> {
    trigger: T,
    echo: E,
    delay: D,
    unit: DistanceUnit,
}

impl<T, E, D> Hcsr04<T, E, D>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
{
    pub fn new(trigger: T, echo: E, delay: D, unit: DistanceUnit) -> Self {
        Self {
            trigger,
            echo,
            delay,
            unit,
        }
    }

    /// Release the pins and delay provider.
    pub fn release(self) -> (T, E, D) {
        (self.trigger, self.echo, self.delay)
    }

    fn pulse_trigger(&mut self) -> Result<(), ProbeError> {
        let pin_err = |_| ProbeError::Pin {
            operation: "drive trigger pin",
        };
        self.trigger.set_low().map_err(pin_err)?;
        self.delay.delay_us(2);
        self.trigger.set_high().map_err(pin_err)?;
        self.delay.delay_us(10);
        self.trigger.set_low().map_err(pin_err)?;
        Ok(())
    }

    fn echo_is_high(&mut self) -> Result<bool, ProbeError> {
        self.echo.is_high().map_err(|e| {
            error!("HC-SR04 echo read failed: {:?}", e);
            ProbeError::Pin {
                operation: "read echo pin",
            }
        })
    }

    /// Time the echo pulse. `None` when it never starts or never ends.
    fn echo_pulse_micros(&mut self) -> Result<Option<u32>, ProbeError> {
        let mut waited = 0;
        while !self.echo_is_high()? {
            if waited >= ECHO_TIMEOUT_US {
                return Ok(None);
            }
            self.delay.delay_us(1);
            waited += 1;
        }

        let mut width = 0;
        loop {
            self.delay.delay_us(1);
            width += 1;
            if !self.echo_is_high()? {
                return Ok(Some(width));
            }
            if width >= ECHO_TIMEOUT_US {
                return Ok(None);
            }
        }
    }
}

impl<T, E, D> DistanceProbe for Hcsr04<T, E, D>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
{
    type Error = ProbeError;

    fn measure(&mut self) -> Result<Reading, ProbeError> {
        self.pulse_trigger()?;

        match self.echo_pulse_micros()? {
            Some(micros) => Ok(Reading::Distance(self.unit.from_echo_micros(micros))),
            None => {
                debug!("HC-SR04: no echo within {} us", ECHO_TIMEOUT_US);
                Ok(Reading::NoEcho)
            }
        }
    }

    fn unit(&self) -> DistanceUnit {
        self.unit
    }
}
