//! Simulate command: replay the schedule between two local datetimes.
//!
//! A [`SimulatedClock`] fast-forwards through every planned sleep, so a full
//! day of wakes prints in well under a second.

use anyhow::{Result, anyhow};
use chrono::{DateTime, Local};
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::color::conversion::mired_to_kelvin;
use crate::config::Config;
use crate::core::format_duration;
use crate::logger::Log;
use crate::schedule::FluxSchedule;
use crate::time_source::{Clock, SimulatedClock, SleepOutcome, parse_datetime};

/// One planner wake during a simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedWake {
    pub at: DateTime<Local>,
    pub mired: i32,
    pub sleep: Duration,
}

/// Walk `schedule` with `clock` until the clock reaches its end.
pub fn simulate(schedule: &FluxSchedule, clock: &SimulatedClock) -> Result<Vec<SimulatedWake>> {
    let (_sender, receiver) = channel();
    let mut wakes = Vec::new();

    loop {
        let at = clock.now();
        let mired = schedule.color_temperature_at(&at)?;
        let sleep = schedule.next_wake(&at)?;
        wakes.push(SimulatedWake { at, mired, sleep });

        match clock.sleep(sleep, &receiver) {
            SleepOutcome::Elapsed | SleepOutcome::Refreshed => {}
            SleepOutcome::Shutdown | SleepOutcome::Ended => break,
        }
    }

    Ok(wakes)
}

pub fn handle_simulate_command(
    config: &Config,
    start_time: &str,
    end_time: &str,
    debug_enabled: bool,
) -> Result<()> {
    let start = parse_datetime(start_time).map_err(|e| anyhow!("Invalid start time: {e}"))?;
    let end = parse_datetime(end_time).map_err(|e| anyhow!("Invalid end time: {e}"))?;
    if end <= start {
        anyhow::bail!("End time must be after start time");
    }

    let schedule = super::build_schedule(config)?;

    log_block_start!("Simulation Mode");
    let span = end.signed_duration_since(start);
    log_decorated!(
        "Simulating from {} to {}",
        start.format("%Y-%m-%d %H:%M:%S"),
        end.format("%Y-%m-%d %H:%M:%S")
    );
    log_indented!(
        "Total simulated time: {} hours {} minutes",
        span.num_hours(),
        span.num_minutes() % 60
    );

    let clock = SimulatedClock::new(start, end);
    let wakes = simulate(&schedule, &clock)?;

    for (i, wake) in wakes.iter().enumerate() {
        let kelvin = mired_to_kelvin(wake.mired)?;
        let changed = i == 0 || wakes[i - 1].mired != wake.mired;

        if changed || debug_enabled {
            Log::set_simulated_time(Some(wake.at));
            log_block_start!(
                "{} mired ({:.0}K), next change in {}",
                wake.mired,
                kelvin,
                format_duration(wake.sleep)
            );
        }
    }
    drop(clock);

    log_block_start!("Simulation complete: {} wake(s)", wakes.len());
    log_end!();
    Ok(())
}
