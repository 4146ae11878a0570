//! Command-line command handlers.
//!
//! Each command lives in its own submodule; shared setup that turns a loaded
//! [`Config`] into runtime objects lives here.

pub mod help;
pub mod plan;
pub mod simulate;
pub mod status;
pub mod watch;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::schedule::{FluxSchedule, SunriseCalculator};

/// Build the schedule for the configured location using real solar times.
pub(crate) fn build_schedule(config: &Config) -> Result<FluxSchedule> {
    FluxSchedule::new(
        config.geo(),
        config.schedule_config()?,
        Box::new(SunriseCalculator),
    )
    .context("Failed to build schedule from configuration")
}
