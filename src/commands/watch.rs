//! Watch command: run the scheduling loop until shutdown.
//!
//! Each snapshot file stands in for one bridge and gets its own loop.

use anyhow::Result;
use std::path::PathBuf;

use crate::bridge::{Bridge, SnapshotFileBridge};
use crate::config::Config;
use crate::core::{FluxLoop, StatusFile};
use crate::lights::LightCommandGrouper;
use crate::signals::setup_signal_handler;
use crate::time_source::SystemClock;

pub fn handle_watch_command(
    config: &Config,
    snapshots: &[PathBuf],
    light_level: Option<f64>,
    debug_enabled: bool,
) -> Result<()> {
    let bridges = snapshots
        .iter()
        .map(|path| {
            SnapshotFileBridge::open(path, debug_enabled)
                .map(|bridge| Box::new(bridge) as Box<dyn Bridge>)
        })
        .collect::<Result<Vec<_>>>()?;

    let schedule = super::build_schedule(config)?;
    let mut flux = FluxLoop::new(
        schedule,
        LightCommandGrouper::new(config.light_controls()),
        config.brightness_policy(),
        config.min_update_interval(),
        SystemClock,
    )
    .with_light_level(light_level)
    .with_debug(debug_enabled);

    if let Some(path) = &config.status_file {
        flux = flux.with_status_sink(Box::new(StatusFile::new(path.clone())));
    }

    let signal_state = setup_signal_handler(debug_enabled)?;

    log_block_start!("Watching {} bridge(s)", bridges.len());
    for path in snapshots {
        log_indented!("{}", path.display());
    }
    if debug_enabled {
        log_pipe!();
        log_debug!("Send SIGUSR1 to run a cycle immediately (PID {})", std::process::id());
    }

    flux.run_all(bridges, signal_state.signal_receiver)?;

    log_block_start!("Shutting down hueflux...");
    log_end!();
    Ok(())
}
