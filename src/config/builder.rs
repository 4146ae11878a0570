//! Default configuration file generation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;

/// Write a documented default `hueflux.toml` to `path`, creating parent
/// directories as needed.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let mut config_content = ConfigBuilder::new()
        .add_section("Location")
        .add_setting(
            "latitude",
            &format!("{DEFAULT_LATITUDE:.6}"),
            &format!("Geographic latitude ({MINIMUM_LATITUDE} to {MAXIMUM_LATITUDE})"),
        )
        .add_setting(
            "longitude",
            &format!("{DEFAULT_LONGITUDE:.6}"),
            &format!("Geographic longitude ({MINIMUM_LONGITUDE} to {MAXIMUM_LONGITUDE})"),
        )
        .add_section("Schedule")
        .add_setting(
            "stop_time",
            &format!("\"{DEFAULT_STOP_TIME}\""),
            "Local time the day ends at stop_temp (HH:MM:SS)",
        )
        .add_setting(
            "sunrise_temp",
            &DEFAULT_SUNRISE_TEMP.to_string(),
            &format!("Color temperature at sunrise ({MINIMUM_TEMP}-{MAXIMUM_TEMP}) Kelvin"),
        )
        .add_setting(
            "solar_noon_temp",
            &DEFAULT_SOLAR_NOON_TEMP.to_string(),
            &format!("Color temperature at solar noon ({MINIMUM_TEMP}-{MAXIMUM_TEMP}) Kelvin"),
        )
        .add_setting(
            "sunset_temp",
            &DEFAULT_SUNSET_TEMP.to_string(),
            &format!("Color temperature at sunset ({MINIMUM_TEMP}-{MAXIMUM_TEMP}) Kelvin"),
        )
        .add_setting(
            "stop_temp",
            &DEFAULT_STOP_TEMP.to_string(),
            &format!(
                "Color temperature from stop time to sunrise ({MINIMUM_TEMP}-{MAXIMUM_TEMP}) Kelvin"
            ),
        )
        .add_section("Lights")
        .add_setting(
            "transition_duration",
            &DEFAULT_TRANSITION_DURATION.to_string(),
            &format!(
                "Command fade in seconds ({}-{})",
                MINIMUM_TRANSITION_DURATION, MAXIMUM_TRANSITION_DURATION
            ),
        )
        .add_setting(
            "min_brightness",
            &DEFAULT_MIN_BRIGHTNESS.to_string(),
            &format!(
                "Daytime brightness at the darkest light level ({MIN_BRIGHTNESS}-{MAX_BRIGHTNESS})"
            ),
        )
        .add_setting(
            "max_brightness",
            &DEFAULT_MAX_BRIGHTNESS.to_string(),
            &format!(
                "Brightness at night and in full daylight ({MIN_BRIGHTNESS}-{MAX_BRIGHTNESS})"
            ),
        )
        .add_setting(
            "min_light_level",
            &format!("{DEFAULT_MIN_LIGHT_LEVEL:.1}"),
            "Sensor light level mapped to min_brightness",
        )
        .add_setting(
            "max_light_level",
            &format!("{DEFAULT_MAX_LIGHT_LEVEL:.1}"),
            "Sensor light level mapped to max_brightness",
        )
        .add_setting(
            "min_update_interval",
            &DEFAULT_MIN_UPDATE_INTERVAL.to_string(),
            &format!(
                "Shortest cycle sleep in seconds ({}-{})",
                MINIMUM_UPDATE_INTERVAL, MAXIMUM_UPDATE_INTERVAL
            ),
        )
        .build();

    config_content.push_str(
        "\n\n# Per-light overrides, matched by name (case-insensitive):\n\
         # [[lights]]\n\
         # name = \"Desk Lamp\"\n\
         # control_brightness = false\n\
         # control_temperature = true\n",
    );

    fs::write(path, config_content).context("Failed to write default config file")?;
    Ok(())
}

/// Lines of a generated config file with aligned trailing comments.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        let width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !result.is_empty() {
                        result.push(String::new());
                    }
                    result.push(title);
                }
                ConfigEntry::Setting { line, comment } => {
                    result.push(format!("{line:width$}{comment}"));
                }
            }
        }

        result.join("\n")
    }
}
