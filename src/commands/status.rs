//! Status command: today's anchors and the current targets.
//!
//! The anchor table is logged for reading; the [`FluxStatus`] snapshot is
//! printed to stdout as JSON so it can be piped elsewhere.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs;

use crate::config::Config;
use crate::core::{FluxStatus, StatusHistory, format_duration};
use crate::time_source::Clock;

pub fn handle_status_command(
    config: &Config,
    clock: &dyn Clock,
    debug_enabled: bool,
) -> Result<()> {
    let schedule = super::build_schedule(config)?;
    let now = clock.now();
    let table = schedule.table_at(&now)?;

    log_block_start!("Schedule for {}", table.date().format("%Y-%m-%d"));
    for anchor in table.anchors() {
        log_indented!(
            "{:<11} {}  {} mired",
            anchor.kind.label(),
            anchor.time.with_timezone(&Local).format("%H:%M:%S"),
            anchor.mired
        );
    }

    let status = FluxStatus::capture(&schedule, &now, &StatusHistory::default())?;
    log_block_start!(
        "Current target: {} mired, next change in {}",
        status.flux_color_temperature,
        format_duration(std::time::Duration::from_secs(status.next_wake_seconds))
    );

    if let Some(path) = &config.status_file {
        match fs::read_to_string(path) {
            Ok(content) => {
                log_block_start!("Last applied state ({})", path.display());
                for line in content.lines() {
                    log_indented!("{line}");
                }
            }
            Err(e) if debug_enabled => {
                log_pipe!();
                log_debug!("No status file at {}: {e}", path.display());
            }
            Err(_) => {}
        }
    }

    if debug_enabled {
        log_pipe!();
        log_debug!(
            "Solar times (UTC): sunrise {}, noon {}, sunset {}",
            status.sunrise.format("%H:%M:%S"),
            status.solar_noon.format("%H:%M:%S"),
            status.sunset.format("%H:%M:%S")
        );
    }
    log_end!();

    let json = serde_json::to_string_pretty(&status).context("Failed to serialize status")?;
    println!("{json}");
    Ok(())
}
