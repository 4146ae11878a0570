//! Configuration for hueflux.
//!
//! Settings live in `hueflux.toml`, by default under
//! `$XDG_CONFIG_HOME/hueflux/`. Every field is optional; missing values fall
//! back to the defaults in [`crate::common::constants`]. When the default
//! file does not exist it is created with every setting documented.
//!
//! ```toml
//! #[Location]
//! latitude = 47.606200            # Geographic latitude (-90 to 90)
//! longitude = -122.332100         # Geographic longitude (-180 to 180)
//!
//! #[Schedule]
//! stop_time = "22:00:00"          # Local time the day ends at stop_temp (HH:MM:SS)
//! sunrise_temp = 3000             # Color temperature at sunrise (1000-20000) Kelvin
//! solar_noon_temp = 5000          # Color temperature at solar noon (1000-20000) Kelvin
//! sunset_temp = 2700              # Color temperature at sunset (1000-20000) Kelvin
//! stop_temp = 2200                # Color temperature from stop time to sunrise (1000-20000) Kelvin
//!
//! #[Lights]
//! transition_duration = 60        # Command fade in seconds (0-6553)
//! min_brightness = 64             # Daytime brightness at the darkest light level (0-254)
//! max_brightness = 254            # Brightness at night and in full daylight (0-254)
//! min_light_level = 3000.0        # Sensor light level mapped to min_brightness
//! max_light_level = 25500.0       # Sensor light level mapped to max_brightness
//! min_update_interval = 240       # Shortest cycle sleep in seconds (1-3600)
//!
//! [[lights]]
//! name = "Desk Lamp"
//! control_brightness = false
//! control_temperature = true
//! ```

pub mod builder;
pub mod loading;
pub mod validation;

use anyhow::{Context, Result};
use chrono::NaiveTime;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::constants::*;
use crate::lights::{BrightnessPolicy, LightControl, LightControls};
use crate::schedule::{GeoTime, ScheduleConfig};

pub use builder::create_default_config;
pub use loading::{get_config_path, load, load_from_path};
pub use validation::validate_config;

/// Per-fixture override of what hueflux may change, matched by name.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LightOverride {
    pub name: String,
    #[serde(default = "default_control")]
    pub control_brightness: bool,
    #[serde(default = "default_control")]
    pub control_temperature: bool,
}

fn default_control() -> bool {
    true
}

/// Contents of `hueflux.toml`.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,

    /// Local wall-clock time ("HH:MM:SS") at which the day reaches `stop_temp`.
    pub stop_time: Option<String>,
    pub sunrise_temp: Option<u32>,
    pub solar_noon_temp: Option<u32>,
    pub sunset_temp: Option<u32>,
    pub stop_temp: Option<u32>,

    /// Seconds.
    pub transition_duration: Option<u64>,
    pub min_brightness: Option<u8>,
    pub max_brightness: Option<u8>,
    pub min_light_level: Option<f64>,
    pub max_light_level: Option<f64>,
    /// Seconds.
    pub min_update_interval: Option<u64>,

    /// JSON file rewritten with the last applied state after every cycle.
    pub status_file: Option<PathBuf>,

    pub lights: Option<Vec<LightOverride>>,
}

impl Config {
    pub fn geo(&self) -> GeoTime {
        GeoTime::new(
            self.latitude.unwrap_or(DEFAULT_LATITUDE),
            self.longitude.unwrap_or(DEFAULT_LONGITUDE),
        )
    }

    pub fn stop_time(&self) -> Result<NaiveTime> {
        let stop_time = self.stop_time.as_deref().unwrap_or(DEFAULT_STOP_TIME);
        NaiveTime::parse_from_str(stop_time, "%H:%M:%S")
            .with_context(|| format!("Invalid stop_time '{stop_time}'. Use HH:MM:SS format"))
    }

    pub fn schedule_config(&self) -> Result<ScheduleConfig> {
        Ok(ScheduleConfig {
            stop_time: self.stop_time()?,
            sunrise_temp: self.sunrise_temp.unwrap_or(DEFAULT_SUNRISE_TEMP),
            solar_noon_temp: self.solar_noon_temp.unwrap_or(DEFAULT_SOLAR_NOON_TEMP),
            sunset_temp: self.sunset_temp.unwrap_or(DEFAULT_SUNSET_TEMP),
            stop_temp: self.stop_temp.unwrap_or(DEFAULT_STOP_TEMP),
            transition: Duration::from_secs(
                self.transition_duration.unwrap_or(DEFAULT_TRANSITION_DURATION),
            ),
        })
    }

    pub fn brightness_policy(&self) -> BrightnessPolicy {
        BrightnessPolicy {
            min_brightness: self.min_brightness.unwrap_or(DEFAULT_MIN_BRIGHTNESS),
            max_brightness: self.max_brightness.unwrap_or(DEFAULT_MAX_BRIGHTNESS),
            min_light_level: self.min_light_level.unwrap_or(DEFAULT_MIN_LIGHT_LEVEL),
            max_light_level: self.max_light_level.unwrap_or(DEFAULT_MAX_LIGHT_LEVEL),
        }
    }

    pub fn light_controls(&self) -> LightControls {
        let mut controls = LightControls::new();
        for light in self.lights.iter().flatten() {
            controls.insert(
                light.name.trim(),
                LightControl {
                    brightness: light.control_brightness,
                    temperature: light.control_temperature,
                },
            );
        }
        controls
    }

    pub fn min_update_interval(&self) -> Duration {
        Duration::from_secs(self.min_update_interval.unwrap_or(DEFAULT_MIN_UPDATE_INTERVAL))
    }

    /// Print the effective settings in the logger's block format.
    pub fn log_config(&self, path: &Path) {
        log_block_start!("Loaded configuration");
        log_indented!("Path: {}", path.display());

        let geo = self.geo();
        log_indented!("Location: {:.4}, {:.4}", geo.latitude, geo.longitude);
        log_indented!("Stop time: {}", self.stop_time.as_deref().unwrap_or(DEFAULT_STOP_TIME));
        log_indented!(
            "Temperatures: sunrise {}K, solar noon {}K, sunset {}K, stop {}K",
            self.sunrise_temp.unwrap_or(DEFAULT_SUNRISE_TEMP),
            self.solar_noon_temp.unwrap_or(DEFAULT_SOLAR_NOON_TEMP),
            self.sunset_temp.unwrap_or(DEFAULT_SUNSET_TEMP),
            self.stop_temp.unwrap_or(DEFAULT_STOP_TEMP)
        );

        let policy = self.brightness_policy();
        log_indented!(
            "Brightness: {}-{} over light level {}-{}",
            policy.min_brightness,
            policy.max_brightness,
            policy.min_light_level,
            policy.max_light_level
        );
        log_indented!(
            "Transition: {}s, minimum update interval: {}s",
            self.transition_duration.unwrap_or(DEFAULT_TRANSITION_DURATION),
            self.min_update_interval().as_secs()
        );

        let overrides = self.lights.as_deref().unwrap_or_default();
        if !overrides.is_empty() {
            log_indented!("Light overrides: {}", overrides.len());
        }
    }
}
