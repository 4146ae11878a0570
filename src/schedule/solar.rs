//! Solar event calculation for a calendar date and location.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use super::{GeoTime, ScheduleError};

/// Sunrise, solar noon and sunset for one date, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarTimes {
    pub sunrise: DateTime<Utc>,
    pub solar_noon: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

/// Capability that turns a date and location into solar events.
pub trait SolarCalculator: Send + Sync {
    fn solar_times(&self, date: NaiveDate, geo: GeoTime) -> Result<SolarTimes, ScheduleError>;
}

/// Astronomical calculation backed by the `sunrise` crate.
///
/// Solar noon is the midpoint between sunrise and sunset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SunriseCalculator;

impl SolarCalculator for SunriseCalculator {
    fn solar_times(&self, date: NaiveDate, geo: GeoTime) -> Result<SolarTimes, ScheduleError> {
        use sunrise::{Coordinates, SolarDay, SolarEvent};

        let coord = Coordinates::new(geo.latitude, geo.longitude).ok_or_else(|| {
            ScheduleError::Solar(format!(
                "invalid coordinates {:.4}°, {:.4}°",
                geo.latitude, geo.longitude
            ))
        })?;
        let solar_day = SolarDay::new(coord, date);
        let sunrise = solar_day.event_time(SolarEvent::Sunrise);
        let sunset = solar_day.event_time(SolarEvent::Sunset);

        // Polar day or night yields collapsed, inverted or far-off events
        let off_date = (sunrise.date_naive() - date).num_days().abs() > 1;
        if off_date || sunset <= sunrise || sunset - sunrise >= Duration::days(1) {
            return Err(ScheduleError::Solar(format!(
                "no sunrise/sunset on {date} at {:.4}°, {:.4}°",
                geo.latitude, geo.longitude
            )));
        }

        Ok(SolarTimes {
            sunrise,
            solar_noon: sunrise + (sunset - sunrise) / 2,
            sunset,
        })
    }
}

/// Fixed UTC clock times, applied to every date. Used by simulations and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedSolarCalculator {
    pub sunrise: chrono::NaiveTime,
    pub solar_noon: chrono::NaiveTime,
    pub sunset: chrono::NaiveTime,
}

impl SolarCalculator for FixedSolarCalculator {
    fn solar_times(&self, date: NaiveDate, _geo: GeoTime) -> Result<SolarTimes, ScheduleError> {
        let at = |time| date.and_time(time).and_utc();
        Ok(SolarTimes {
            sunrise: at(self.sunrise),
            solar_noon: at(self.solar_noon),
            sunset: at(self.sunset),
        })
    }
}
