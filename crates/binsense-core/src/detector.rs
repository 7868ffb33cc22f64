//! Debounced deposit detection
//!
//! Turns a stream of periodic distance samples into discrete hit events. A
//! hit is a sample that comes closer than the previous one by more than the
//! configured threshold. After each hit the next `max_timeout_ticks` samples
//! are ignored, which enforces a minimum spacing between events.

use log::debug;

use crate::config::HitDetectorConfig;
use crate::probe::DistanceProbe;

/// One detector per physical sensor.
#[derive(Debug, Clone)]
pub struct HitDetector {
    config: HitDetectorConfig,
    last_distance: u32,
    hit_delta: i64,
    timeout: u8,
    counter: u32,
}

impl HitDetector {
    pub fn new(config: HitDetectorConfig) -> Self {
        Self {
            config,
            last_distance: 0,
            hit_delta: 0,
            timeout: 0,
            counter: 0,
        }
    }

    /// Replace the configuration and reset all state to the baseline.
    pub fn configure(&mut self, config: HitDetectorConfig) {
        *self = Self::new(config);
    }

    pub fn config(&self) -> &HitDetectorConfig {
        &self.config
    }

    /// Feed one raw distance sample. Returns true when it counts as a hit.
    pub fn sample(&mut self, raw_distance: u32) -> bool {
        let distance = raw_distance.min(self.config.max_distance);
        self.hit_delta = self.last_distance as i64 - distance as i64;
        self.last_distance = distance;

        if self.timeout > 0 {
            self.timeout -= 1;
            return false;
        }

        if self.hit_delta > self.config.difference_threshold as i64 {
            self.timeout = self.config.max_timeout_ticks;
            self.inc_counter(1);
            debug!(
                "Hit: delta {} {}, counter {}",
                self.hit_delta,
                self.config.unit.label(),
                self.counter
            );
            return true;
        }

        false
    }

    /// Take one measurement from `probe` and feed it to [`sample`](Self::sample).
    ///
    /// A missing echo is sampled as `max_distance`.
    pub fn poll<P: DistanceProbe>(&mut self, probe: &mut P) -> Result<bool, P::Error> {
        let reading = probe.measure()?;
        Ok(self.sample(reading.or_max(self.config.max_distance)))
    }

    /// Delta computed by the most recent sample (positive means closer).
    pub fn last_hit_delta(&self) -> i64 {
        self.hit_delta
    }

    pub fn last_distance(&self) -> u32 {
        self.last_distance
    }

    pub fn is_cooling_down(&self) -> bool {
        self.timeout > 0
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Set the event counter. Values above `max_counter` wrap to 0.
    pub fn set_counter(&mut self, value: u32) {
        self.counter = if value > self.config.max_counter {
            0
        } else {
            value
        };
    }

    /// Add to the event counter, wrapping to 0 past `max_counter`.
    pub fn inc_counter(&mut self, by: u32) {
        match self.counter.checked_add(by) {
            Some(value) => self.set_counter(value),
            None => self.counter = 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DistanceUnit;
    use crate::probe::Reading;

    fn config(threshold: u32, ticks: u8, max_counter: u32) -> HitDetectorConfig {
        HitDetectorConfig {
            max_distance: 50,
            difference_threshold: threshold,
            max_timeout_ticks: ticks,
            max_counter,
            unit: DistanceUnit::Centimeters,
        }
    }

    fn run(detector: &mut HitDetector, samples: &[u32]) -> [bool; 16] {
        let mut hits = [false; 16];
        for (i, &s) in samples.iter().enumerate() {
            hits[i] = detector.sample(s);
        }
        hits
    }

    #[test]
    fn test_deposit_scenario() {
        let mut detector = HitDetector::new(config(10, 3, 99));
        let hits = run(&mut detector, &[50, 50, 30, 30, 30, 10]);
        assert_eq!(hits[..6], [false, false, true, false, false, false]);
        assert_eq!(detector.counter(), 1);
        assert_eq!(detector.last_hit_delta(), 20);
        assert_eq!(detector.last_distance(), 10);
    }

    #[test]
    fn test_first_sample_never_hits() {
        let mut detector = HitDetector::new(config(10, 3, 99));
        assert!(!detector.sample(0));
        assert_eq!(detector.last_hit_delta(), 0);

        let mut detector = HitDetector::new(config(10, 3, 99));
        assert!(!detector.sample(40));
        assert_eq!(detector.last_hit_delta(), -40);
    }

    #[test]
    fn test_small_deltas_never_fire() {
        let mut detector = HitDetector::new(config(10, 3, 99));
        // Each step closes in by exactly the threshold, or moves away
        for s in [50, 40, 30, 20, 10, 0, 50, 45, 35, 25] {
            assert!(!detector.sample(s));
        }
        assert_eq!(detector.counter(), 0);
    }

    #[test]
    fn test_readings_clamped_to_max_distance() {
        let mut detector = HitDetector::new(config(10, 3, 99));
        detector.sample(400);
        assert_eq!(detector.last_distance(), 50);
        // 400 -> 45 would be a big jump; clamped it is only 5
        assert!(!detector.sample(45));
        assert_eq!(detector.last_hit_delta(), 5);
    }

    #[test]
    fn test_cooldown_suppresses_max_timeout_ticks() {
        let ticks = 4;
        let mut detector = HitDetector::new(config(10, ticks, 99));
        detector.sample(50);
        assert!(detector.sample(20));

        // Alternate far/near so every suppressed sample would qualify
        for i in 0..ticks {
            assert!(detector.is_cooling_down());
            let s = if i % 2 == 0 { 50 } else { 20 };
            assert!(!detector.sample(s));
        }
        assert!(!detector.is_cooling_down());

        // Last suppressed sample was 20; back away and close in again
        assert!(!detector.sample(50));
        assert!(detector.sample(20));
        assert_eq!(detector.counter(), 2);
    }

    #[test]
    fn test_zero_ticks_allows_back_to_back_hits() {
        let mut detector = HitDetector::new(config(10, 0, 99));
        detector.sample(50);
        assert!(detector.sample(30));
        assert!(detector.sample(10));
        assert_eq!(detector.counter(), 2);
    }

    #[test]
    fn test_counter_wraps_on_hit() {
        let mut detector = HitDetector::new(config(10, 0, 2));
        let mut counters = [0u32; 4];
        for c in counters.iter_mut() {
            detector.sample(50);
            assert!(detector.sample(20));
            *c = detector.counter();
        }
        assert_eq!(counters, [1, 2, 0, 1]);
    }

    #[test]
    fn test_set_and_inc_counter_wrap() {
        let mut detector = HitDetector::new(config(10, 3, 99));
        detector.set_counter(99);
        assert_eq!(detector.counter(), 99);
        detector.set_counter(100);
        assert_eq!(detector.counter(), 0);

        detector.set_counter(97);
        detector.inc_counter(2);
        assert_eq!(detector.counter(), 99);
        detector.inc_counter(1);
        assert_eq!(detector.counter(), 0);
    }

    #[test]
    fn test_inc_counter_overflow_wraps() {
        let mut detector = HitDetector::new(config(10, 3, u32::MAX));
        detector.set_counter(u32::MAX);
        assert_eq!(detector.counter(), u32::MAX);
        detector.inc_counter(1);
        assert_eq!(detector.counter(), 0);

        detector.set_counter(u32::MAX - 1);
        detector.inc_counter(5);
        assert_eq!(detector.counter(), 0);
    }

    #[test]
    fn test_hit_at_full_u32_range_wraps() {
        let mut detector = HitDetector::new(config(10, 0, u32::MAX));
        detector.set_counter(u32::MAX);
        detector.sample(50);
        assert!(detector.sample(20));
        assert_eq!(detector.counter(), 0);
    }

    #[test]
    fn test_configure_resets_state() {
        let mut detector = HitDetector::new(config(10, 3, 99));
        detector.sample(50);
        detector.sample(20);
        assert!(detector.is_cooling_down());

        detector.configure(config(5, 1, 10));
        assert_eq!(detector.counter(), 0);
        assert_eq!(detector.last_distance(), 0);
        assert_eq!(detector.last_hit_delta(), 0);
        assert!(!detector.is_cooling_down());
        assert_eq!(detector.config().difference_threshold, 5);
    }

    struct ScriptedProbe<'a> {
        readings: &'a [Reading],
        next: usize,
    }

    impl DistanceProbe for ScriptedProbe<'_> {
        type Error = ();

        fn measure(&mut self) -> Result<Reading, ()> {
            let reading = self.readings.get(self.next).copied().ok_or(())?;
            self.next += 1;
            Ok(reading)
        }

        fn unit(&self) -> DistanceUnit {
            DistanceUnit::Centimeters
        }
    }

    #[test]
    fn test_poll_treats_no_echo_as_max_distance() {
        let readings = [
            Reading::Distance(30),
            Reading::NoEcho,
            Reading::Distance(20),
        ];
        let mut probe = ScriptedProbe {
            readings: &readings,
            next: 0,
        };
        let mut detector = HitDetector::new(config(10, 3, 99));

        assert!(!detector.poll(&mut probe).unwrap());
        assert!(!detector.poll(&mut probe).unwrap());
        assert_eq!(detector.last_distance(), 50);
        assert!(detector.poll(&mut probe).unwrap());
        assert_eq!(detector.poll(&mut probe), Err(()));
    }
}
