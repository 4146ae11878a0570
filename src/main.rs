//! hueflux entry point.
//!
//! Parses the command line, sets up file logging when asked, loads the
//! configuration and hands off to the matching command handler.

use anyhow::Result;

use hueflux::args::{CliAction, GlobalOptions, ParsedArgs};
use hueflux::commands::{help, plan, simulate, status, watch};
use hueflux::common::constants::EXIT_FAILURE;
use hueflux::config::{self, Config};
use hueflux::logger::{Log, LoggerGuard};
use hueflux::time_source::SystemClock;
use hueflux::{log_end, log_error_exit, log_indented, log_pipe, log_version};

fn main() {
    let parsed_args = ParsedArgs::parse(std::env::args());

    let result = match parsed_args.action {
        CliAction::ShowVersion => {
            help::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            help::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            help::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Status { options } => with_config(&options, |config| {
            status::handle_status_command(config, &SystemClock, options.debug_enabled)
        }),
        CliAction::Simulate {
            options,
            start_time,
            end_time,
        } => with_config(&options, |config| {
            simulate::handle_simulate_command(config, &start_time, &end_time, options.debug_enabled)
        }),
        CliAction::Plan {
            options,
            snapshot,
            brightness,
            last_brightness,
        } => with_config(&options, |config| {
            plan::handle_plan_command(config, &snapshot, &SystemClock, brightness, last_brightness)
        }),
        CliAction::Watch {
            options,
            snapshots,
            light_level,
        } => with_config(&options, |config| {
            watch::handle_watch_command(config, &snapshots, light_level, options.debug_enabled)
        }),
    };

    if result.is_err() {
        std::process::exit(EXIT_FAILURE);
    }
}

/// Start file logging, load the configuration and run `command`.
///
/// Errors are reported here so they reach the log file before the guard
/// closes it.
fn with_config(
    options: &GlobalOptions,
    command: impl FnOnce(&Config) -> Result<()>,
) -> Result<()> {
    let _log_guard: Option<LoggerGuard> = match &options.log_file {
        Some(path) => Some(
            Log::start_file_logging(path.display().to_string()).inspect_err(report_error)?,
        ),
        None => None,
    };

    run(options, command).inspect_err(report_error)
}

fn run(options: &GlobalOptions, command: impl FnOnce(&Config) -> Result<()>) -> Result<()> {
    log_version!();
    let config = config::load(options.config_path.as_deref())?;
    if options.debug_enabled {
        let path = config::get_config_path(options.config_path.as_deref())?;
        config.log_config(&path);
    }

    command(&config)
}

fn report_error(e: &anyhow::Error) {
    log_pipe!();
    log_error_exit!("{e}");
    for cause in e.chain().skip(1) {
        log_indented!("Caused by: {cause}");
    }
    log_end!();
}
