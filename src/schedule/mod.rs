//! Day schedule of color temperature anchors and the math that runs on it.
//!
//! A [`ScheduleTable`] holds the anchor points for one local calendar day:
//!
//! - night floor (stop temperature, 30 minutes before sunrise)
//! - sunrise
//! - solar noon
//! - sunset (only when it happens before the stop time)
//! - stop time
//!
//! The table is periodic with a 24h period for bracketing purposes. The
//! [`FluxSchedule`] service rebuilds tables on demand, interpolates the
//! current color temperature and plans how long the caller may sleep.

pub mod error;
pub mod planner;
pub mod solar;
pub mod table;

use chrono::NaiveTime;
use std::time::Duration;

use crate::color::conversion::kelvin_to_mired;

pub use error::ScheduleError;
pub use planner::FluxSchedule;
pub use solar::{FixedSolarCalculator, SolarCalculator, SolarTimes, SunriseCalculator};
pub use table::{AnchorKind, AnchorPoint, ScheduleTable, interpolate};

/// Location used to compute solar events for any date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTime {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoTime {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Configured wind-down schedule. Temperatures are in Kelvin.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleConfig {
    pub stop_time: NaiveTime,
    pub sunrise_temp: u32,
    pub solar_noon_temp: u32,
    pub sunset_temp: u32,
    pub stop_temp: u32,
    /// Transition time attached to every light command.
    pub transition: Duration,
}

/// Anchor temperatures converted to mired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorTemperatures {
    pub sunrise: i32,
    pub solar_noon: i32,
    pub sunset: i32,
    pub stop: i32,
}

impl ScheduleConfig {
    /// Convert every configured temperature to mired, rejecting zero values.
    pub fn mireds(&self) -> Result<AnchorTemperatures, ScheduleError> {
        let convert = |name: &str, kelvin: u32| {
            kelvin_to_mired(kelvin).map_err(|_| {
                ScheduleError::invalid(format!("{name} must be a positive Kelvin value"))
            })
        };

        Ok(AnchorTemperatures {
            sunrise: convert("sunrise_temp", self.sunrise_temp)?,
            solar_noon: convert("solar_noon_temp", self.solar_noon_temp)?,
            sunset: convert("sunset_temp", self.sunset_temp)?,
            stop: convert("stop_temp", self.stop_temp)?,
        })
    }
}

/// Fixed solar events and a stock schedule for tests.
#[cfg(any(test, feature = "testing-support"))]
pub mod test_support {
    use super::*;

    /// Sunrise 06:00, solar noon 12:00 and sunset 18:00 UTC on every date.
    pub fn fixed_solar() -> FixedSolarCalculator {
        FixedSolarCalculator {
            sunrise: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            solar_noon: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            sunset: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        }
    }

    /// 3000K / 5000K / 2700K / 2200K with the given stop time.
    pub fn config_with_stop(hour: u32, minute: u32) -> ScheduleConfig {
        ScheduleConfig {
            stop_time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap(),
            sunrise_temp: 3000,
            solar_noon_temp: 5000,
            sunset_temp: 2700,
            stop_temp: 2200,
            transition: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::config_with_stop;
    use super::*;

    #[test]
    fn test_mireds_conversion() {
        let mireds = config_with_stop(22, 0).mireds().unwrap();
        assert_eq!(
            mireds,
            AnchorTemperatures {
                sunrise: 333,
                solar_noon: 200,
                sunset: 370,
                stop: 454,
            }
        );
    }

    #[test]
    fn test_zero_temperature_is_invalid_schedule() {
        let mut config = config_with_stop(22, 0);
        config.sunset_temp = 0;
        let err = config.mireds().unwrap_err();
        assert!(
            matches!(err, ScheduleError::InvalidSchedule(ref msg) if msg.contains("sunset_temp"))
        );
    }
}
