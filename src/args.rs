//! Command-line argument parsing.
//!
//! Global flags may appear anywhere on the command line; the first
//! positional argument selects the command and the remaining positionals
//! are its operands.

use std::path::PathBuf;

use crate::common::constants::MAX_BRIGHTNESS;

/// Flags shared by every command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalOptions {
    pub debug_enabled: bool,
    /// Explicit config file, replacing the default location.
    pub config_path: Option<PathBuf>,
    /// Redirect log output to this file.
    pub log_file: Option<PathBuf>,
}

/// What the user asked for.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Print today's schedule and the current status as JSON
    Status { options: GlobalOptions },
    /// Walk the planner between two local datetimes
    Simulate {
        options: GlobalOptions,
        start_time: String,
        end_time: String,
    },
    /// Print command groups for a bridge snapshot
    Plan {
        options: GlobalOptions,
        snapshot: PathBuf,
        brightness: Option<u8>,
        last_brightness: Option<u8>,
    },
    /// Run the scheduling loop against snapshot files
    Watch {
        options: GlobalOptions,
        snapshots: Vec<PathBuf>,
        light_level: Option<f64>,
    },
    ShowHelp,
    ShowVersion,
    /// Show help due to invalid arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

/// Command-specific flags collected before the command is known.
#[derive(Default)]
struct CommandFlags {
    brightness: Option<u8>,
    last_brightness: Option<u8>,
    light_level: Option<f64>,
}

impl CommandFlags {
    fn any(&self) -> bool {
        self.brightness.is_some() || self.last_brightness.is_some() || self.light_level.is_some()
    }
}

impl ParsedArgs {
    /// Parse arguments, skipping the program name in the first position.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        ParsedArgs {
            action: parse_action(args),
        }
    }
}

fn parse_action<I, S>(args: I) -> CliAction
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let args_vec: Vec<String> = args
        .into_iter()
        .skip(1)
        .map(|s| s.as_ref().to_string())
        .collect();

    let mut options = GlobalOptions::default();
    let mut flags = CommandFlags::default();
    let mut positionals: Vec<String> = Vec::new();
    let mut display_help = false;
    let mut display_version = false;

    let mut i = 0;
    while i < args_vec.len() {
        let arg = args_vec[i].as_str();
        // Flags taking a value read it from the next argument
        let value = args_vec.get(i + 1).filter(|v| !v.starts_with("--"));

        match arg {
            "--help" | "-h" => display_help = true,
            "--version" | "-V" | "-v" => display_version = true,
            "--debug" | "-d" => options.debug_enabled = true,
            "--config" | "-c" | "--log" | "-l" => {
                let Some(value) = value else {
                    log_warning!("Missing path for {arg}. Usage: {arg} <path>");
                    return CliAction::ShowHelpDueToError;
                };
                if matches!(arg, "--config" | "-c") {
                    options.config_path = Some(PathBuf::from(value));
                } else {
                    options.log_file = Some(PathBuf::from(value));
                }
                i += 1;
            }
            "--brightness" | "--last-brightness" => {
                let Some(parsed) = value
                    .and_then(|v| v.parse::<u8>().ok())
                    .filter(|b| i32::from(*b) <= MAX_BRIGHTNESS)
                else {
                    log_warning!("{arg} expects a brightness between 0 and 254");
                    return CliAction::ShowHelpDueToError;
                };
                if arg == "--brightness" {
                    flags.brightness = Some(parsed);
                } else {
                    flags.last_brightness = Some(parsed);
                }
                i += 1;
            }
            "--light-level" => {
                let Some(parsed) = value
                    .and_then(|v| v.parse::<f64>().ok())
                    .filter(|level| level.is_finite() && *level >= 0.0)
                else {
                    log_warning!("--light-level expects a non-negative number");
                    return CliAction::ShowHelpDueToError;
                };
                flags.light_level = Some(parsed);
                i += 1;
            }
            _ if arg.starts_with('-') && arg.len() > 1 => {
                log_warning!("Unknown option: {arg}");
                return CliAction::ShowHelpDueToError;
            }
            _ => positionals.push(arg.to_string()),
        }
        i += 1;
    }

    if display_version {
        return CliAction::ShowVersion;
    }
    if display_help {
        return CliAction::ShowHelp;
    }

    let Some((command, operands)) = positionals.split_first() else {
        return CliAction::ShowHelp;
    };

    match command.as_str() {
        "status" | "s" => {
            if !operands.is_empty() || flags.any() {
                log_warning!("status takes no arguments. Usage: hueflux status");
                return CliAction::ShowHelpDueToError;
            }
            CliAction::Status { options }
        }
        "simulate" | "sim" => match operands {
            [start_time, end_time] if !flags.any() => CliAction::Simulate {
                options,
                start_time: start_time.clone(),
                end_time: end_time.clone(),
            },
            _ => {
                log_warning!(
                    "Usage: hueflux simulate \"YYYY-MM-DD HH:MM:SS\" \"YYYY-MM-DD HH:MM:SS\""
                );
                CliAction::ShowHelpDueToError
            }
        },
        "plan" | "p" => match operands {
            [snapshot] if flags.light_level.is_none() => CliAction::Plan {
                options,
                snapshot: PathBuf::from(snapshot),
                brightness: flags.brightness,
                last_brightness: flags.last_brightness,
            },
            _ => {
                log_warning!(
                    "Usage: hueflux plan <LIGHTS.json> [--brightness N] [--last-brightness N]"
                );
                CliAction::ShowHelpDueToError
            }
        },
        "watch" | "w" => {
            if operands.is_empty() || flags.brightness.is_some() || flags.last_brightness.is_some()
            {
                log_warning!("Usage: hueflux watch <LIGHTS.json>... [--light-level N]");
                return CliAction::ShowHelpDueToError;
            }
            CliAction::Watch {
                options,
                snapshots: operands.iter().map(PathBuf::from).collect(),
                light_level: flags.light_level,
            }
        }
        _ => {
            log_warning!("Unknown command: {command}");
            CliAction::ShowHelpDueToError
        }
    }
}
