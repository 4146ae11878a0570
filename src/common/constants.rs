//! Application-wide constants, default values and validation limits.

pub const CONFIG_DIR_NAME: &str = "hueflux";
pub const CONFIG_FILE_NAME: &str = "hueflux.toml";

// # Application Defaults
//
// Used when a field is absent from hueflux.toml.

pub const DEFAULT_STOP_TIME: &str = "22:00:00";
pub const DEFAULT_SUNRISE_TEMP: u32 = 3000; // Kelvin
pub const DEFAULT_SOLAR_NOON_TEMP: u32 = 5000; // Kelvin
pub const DEFAULT_SUNSET_TEMP: u32 = 2700; // Kelvin
pub const DEFAULT_STOP_TEMP: u32 = 2200; // Kelvin, 454 mired
pub const DEFAULT_TRANSITION_DURATION: u64 = 60; // seconds
pub const DEFAULT_MIN_BRIGHTNESS: u8 = 64;
pub const DEFAULT_MAX_BRIGHTNESS: u8 = 254;
pub const DEFAULT_MIN_LIGHT_LEVEL: f64 = 3000.0;
pub const DEFAULT_MAX_LIGHT_LEVEL: f64 = 25500.0;
pub const DEFAULT_MIN_UPDATE_INTERVAL: u64 = 240; // seconds

// Written into a freshly generated config file
pub const DEFAULT_LATITUDE: f64 = 47.6062;
pub const DEFAULT_LONGITUDE: f64 = -122.3321;

// # Validation Limits

pub const MINIMUM_TEMP: u32 = 1000; // Kelvin
pub const MAXIMUM_TEMP: u32 = 20000; // Kelvin
pub const MINIMUM_TRANSITION_DURATION: u64 = 0; // seconds
pub const MAXIMUM_TRANSITION_DURATION: u64 = 6553; // seconds, bridge transition field limit
pub const MINIMUM_UPDATE_INTERVAL: u64 = 1; // seconds
pub const MAXIMUM_UPDATE_INTERVAL: u64 = 3600; // seconds
pub const MINIMUM_LATITUDE: f64 = -90.0;
pub const MAXIMUM_LATITUDE: f64 = 90.0;
pub const MINIMUM_LONGITUDE: f64 = -180.0;
pub const MAXIMUM_LONGITUDE: f64 = 180.0;

// # Device Limits (mired / raw brightness)

pub const MIN_COLOR_TEMPERATURE: i32 = 154;
pub const MAX_COLOR_TEMPERATURE: i32 = 500;
pub const MAX_WHITE_AMBIANCE_COLOR_TEMPERATURE: i32 = 454;
pub const MIN_BRIGHTNESS: i32 = 0;
pub const MAX_BRIGHTNESS: i32 = 254;

// # Command Grouping Thresholds

/// XY distance at or below which a fixture already shows the target color.
pub const XY_MIN_DIFF: f64 = 0.001;
/// XY distance at or above which a fixture is treated as a user-chosen color.
pub const XY_MAX_DIFF: f64 = 0.15;
/// Group brightness at or above this is considered saturated and resynced.
pub const NEAR_MAX_BRIGHTNESS: u8 = 247;

// # Scheduling

pub const NIGHT_FLOOR_LEAD_MINUTES: i64 = 30;
pub const STATUS_HISTORY_LEN: usize = 3;
pub const FLUX_SCENE_MARKER: &str = "flux";

// # Exit Codes

pub const EXIT_FAILURE: i32 = 1;
