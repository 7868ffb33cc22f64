//! Desktop simulator for the binsense bin-monitoring device.
//!
//! Runs the device's control loop against synthetic hardware: two mock
//! ultrasonic probes (one per bin compartment), a clock that advances one
//! minute per tick, and an EEPROM image kept in `eeprom.bin`. Running it
//! again resumes from the saved image, the way the device does after a
//! power cycle.
//!
//! Set `RUST_LOG=info` (or `debug`) to follow along.

mod file_store;
mod mock;

use std::cell::RefCell;

use binsense_core::config::LayoutError;
use binsense_core::storage::{STATS_SLOT_COUNT, TimeMark, print_time};
use binsense_core::{
    DailyStatsStore, DateTime, DeviceConfig, HitDetector, SessionLog, StoreError,
};
use log::{error, info, warn};
use thiserror_no_std::Error;

use file_store::{FileStore, FileStoreError};
use mock::{MockProbe, SimClock};

type Session<'a> = SessionLog<&'a RefCell<FileStore>>;
type Stats<'a> = DailyStatsStore<&'a RefCell<FileStore>>;

// ---------------------------------------------------------------------------
// Simulation constants
// ---------------------------------------------------------------------------

/// EEPROM image file, relative to the working directory.
const EEPROM_PATH: &str = "eeprom.bin";

/// Size of the simulated EEPROM (ATmega328P).
const EEPROM_SIZE: usize = 1024;

/// Clock start on a blank image. Later runs continue from the saved stop mark.
const START: DateTime = DateTime::new(2024, 6, 14, 8, 0);

/// Ticks per run. One tick is one sample and one simulated minute.
const SIM_TICKS: u32 = 2 * 24 * 60;

/// Empty-bin floor distance in centimeters.
const FLOOR_CM: u32 = 45;

/// Mean ticks between deposits into compartment A and B.
const DEPOSIT_EVERY_A: u32 = 53;
const DEPOSIT_EVERY_B: u32 = 131;

#[derive(Error, Debug)]
enum SimError {
    #[error("Invalid store layout: {0}")]
    Layout(LayoutError),
    #[error("EEPROM image I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Store access failed: {0}")]
    Store(#[from] StoreError<FileStoreError>),
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting binsense simulator");

    if let Err(e) = run() {
        error!("Simulator failed: {}", e);
        std::process::exit(1);
    }

    info!("Simulator exiting");
}

fn run() -> Result<(), SimError> {
    let config = DeviceConfig::default();
    config.layout.validate(EEPROM_SIZE).map_err(SimError::Layout)?;
    info!(
        "Layout: session {:?}, stats {:?}",
        config.layout.session_window(),
        config.layout.stats_window()
    );

    let medium = RefCell::new(FileStore::open(EEPROM_PATH, EEPROM_SIZE)?);
    let mut session = SessionLog::new(&medium, config.layout.session_offset);
    let mut stats = DailyStatsStore::new(&medium, config.layout.stats_offset);

    // ---- Boot ---------------------------------------------------------------
    let resumed = session.begin()?;
    let mut clock = SimClock::new(resume_point(resumed, &session));
    if resumed {
        info!(
            "Previous session: {} to {}",
            print_time(session.start()),
            print_time(session.stop())
        );
    }

    if !stats.begin(&clock.now())? {
        info!("Daily stats seeded on a blank image");
    }

    let mut bin_a = HitDetector::new(config.detector);
    let mut bin_b = HitDetector::new(config.detector);
    let mut probe_a = MockProbe::new(FLOOR_CM, DEPOSIT_EVERY_A, 0x5eed);
    let mut probe_b = MockProbe::new(FLOOR_CM, DEPOSIT_EVERY_B, 0xb1a5);
    reconcile(&stats, &mut bin_a, &mut bin_b);
    let mut lid_opens = u32::from(stats.record().count_lid);

    medium.borrow_mut().flush()?;

    // ---- Control loop -------------------------------------------------------
    for _ in 0..SIM_TICKS {
        let now = clock.now();

        let hit_a = poll(&mut bin_a, &mut probe_a);
        let hit_b = poll(&mut bin_b, &mut probe_b);
        if hit_a {
            stats.set_counter_a(to_u16(bin_a.counter()));
        }
        if hit_b {
            stats.set_counter_b(to_u16(bin_b.counter()));
        }
        if hit_a || hit_b {
            lid_opens += 1;
            stats.set_counter_lid(to_u16(lid_opens));
        }

        session.update(&now)?;
        let day = stats.record().day;
        stats.update(&now)?;
        if stats.record().day != day {
            // New day: the stats record restarted at zero
            reconcile(&stats, &mut bin_a, &mut bin_b);
            lid_opens = 0;
        }

        medium.borrow_mut().flush()?;
        clock.advance_minute();
    }

    // ---- Report -------------------------------------------------------------
    for day in 1..STATS_SLOT_COUNT as u8 {
        if let Some(line) = stats.print_history(day)? {
            info!("{}", line);
        }
    }
    match session.duration_minutes() {
        Some(minutes) => info!(
            "Session {} to {}: {} minutes",
            print_time(session.start()),
            print_time(session.stop()),
            minutes
        ),
        None => warn!("No clock tick recorded this session"),
    }

    Ok(())
}

/// Where the clock starts: one minute past the saved stop mark, if any.
fn resume_point(resumed: bool, session: &Session) -> DateTime {
    let stop = session.stop();
    if !resumed || stop.month == 0 {
        return START;
    }

    let mut clock = SimClock::new(DateTime::new(
        resume_year(stop, &START),
        stop.month,
        stop.day,
        stop.hour,
        stop.minute,
    ));
    clock.advance_minute();
    clock.now()
}

/// Year a saved stop mark belongs to.
///
/// The mark carries no year. The clock only runs forward from `start`, so a
/// mark earlier in the calendar than `start` must be from the following year.
/// Runs spanning more than a year in total are not told apart.
fn resume_year(stop: &TimeMark, start: &DateTime) -> u16 {
    let mark = (stop.month, stop.day, stop.hour, stop.minute);
    let origin = (start.month, start.day, start.hour, start.minute);
    if mark < origin {
        start.year + 1
    } else {
        start.year
    }
}

/// Align the detectors' counters with today's persisted counts.
fn reconcile(
    stats: &Stats,
    bin_a: &mut HitDetector,
    bin_b: &mut HitDetector,
) {
    bin_a.set_counter(u32::from(stats.record().count_a));
    bin_b.set_counter(u32::from(stats.record().count_b));
}

fn poll(detector: &mut HitDetector, probe: &mut MockProbe) -> bool {
    match detector.poll(probe) {
        Ok(hit) => hit,
        Err(never) => match never {},
    }
}

fn to_u16(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_year_same_year() {
        let start = DateTime::new(2024, 6, 14, 8, 0);
        assert_eq!(resume_year(&TimeMark::new(14, 6, 8, 0), &start), 2024);
        assert_eq!(resume_year(&TimeMark::new(31, 12, 23, 59), &start), 2024);
    }

    #[test]
    fn test_resume_year_after_new_year() {
        let start = DateTime::new(2024, 6, 14, 8, 0);
        assert_eq!(resume_year(&TimeMark::new(2, 1, 10, 30), &start), 2025);
        assert_eq!(resume_year(&TimeMark::new(14, 6, 7, 59), &start), 2025);
    }
}
