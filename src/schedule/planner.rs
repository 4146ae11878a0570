//! Schedule service: current color temperature and next-wake planning.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use super::table::seconds;
use super::{
    AnchorPoint, GeoTime, ScheduleConfig, ScheduleError, ScheduleTable, SolarCalculator,
};

/// Owns the location, configured schedule and solar capability, and answers
/// every time-dependent question the scheduling loop asks.
///
/// Tables are rebuilt from the date of each query; nothing is cached between calls.
pub struct FluxSchedule {
    geo: GeoTime,
    config: ScheduleConfig,
    solar: Box<dyn SolarCalculator>,
}

impl FluxSchedule {
    /// Validates the configured temperatures up front.
    pub fn new(
        geo: GeoTime,
        config: ScheduleConfig,
        solar: Box<dyn SolarCalculator>,
    ) -> Result<Self, ScheduleError> {
        config.mireds()?;
        Ok(Self { geo, config, solar })
    }

    pub fn geo(&self) -> GeoTime {
        self.geo
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    pub fn table_for<Tz: TimeZone>(
        &self,
        date: NaiveDate,
        tz: &Tz,
    ) -> Result<ScheduleTable, ScheduleError> {
        ScheduleTable::build(date, tz, self.geo, &self.config, self.solar.as_ref())
    }

    /// Table for the local date of `now`.
    pub fn table_at<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Result<ScheduleTable, ScheduleError> {
        self.table_for(now.date_naive(), &now.timezone())
    }

    /// Interpolated mired value at `now`.
    pub fn color_temperature_at<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Result<i32, ScheduleError> {
        self.table_at(now)?.color_temperature_at(now.with_timezone(&Utc))
    }

    /// Whether `now` falls between today's sunrise and sunset.
    pub fn is_daytime<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<bool, ScheduleError> {
        let solar = self.table_at(now)?.solar_times();
        let now = now.with_timezone(&Utc);
        Ok(solar.sunrise <= now && now < solar.sunset)
    }

    /// How long the caller may sleep before the interpolated value changes.
    ///
    /// Walks forward segment by segment, accumulating steps until the value
    /// differs from the one at `now`. The scan is bounded to one day.
    pub fn next_wake<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Result<std::time::Duration, ScheduleError> {
        let tz = now.timezone();
        let start = now.with_timezone(&Utc);
        let mut table = self.table_for(now.date_naive(), &tz)?;
        let initial = table.color_temperature_at(start)?;
        let limit = Duration::days(1);
        let mut cursor = start;

        loop {
            let (a, b) = table.bracket(cursor);
            cursor += step_towards_change(&a, &b, cursor);

            let elapsed = cursor - start;
            if elapsed > limit {
                return Err(ScheduleError::ScheduleLoop {
                    scanned_seconds: elapsed.num_seconds(),
                });
            }

            let date = cursor.with_timezone(&tz).date_naive();
            if date != table.date() {
                table = self.table_for(date, &tz)?;
            }

            if table.color_temperature_at(cursor)? != initial {
                return elapsed
                    .to_std()
                    .map_err(|_| ScheduleError::invalid("planner moved backwards in time"));
            }
        }
    }
}

// One planner step inside the bracket (A, B), never shorter than a second.
// Steps never run past B, so the next iteration brackets from B itself.
fn step_towards_change(a: &AnchorPoint, b: &AnchorPoint, cursor: DateTime<Utc>) -> Duration {
    let to_end = ceil_seconds(b.time - cursor);
    if a.mired == b.mired {
        return to_end;
    }

    let span = seconds(b.time - a.time);
    let seconds_per_unit = span / f64::from((a.mired - b.mired).abs());
    let percent_complete = seconds(cursor - a.time) / span;
    let step = (seconds_per_unit * percent_complete).ceil().max(1.0);
    Duration::seconds(step as i64).min(to_end)
}

// Rounded up to a whole second, at least one
fn ceil_seconds(delta: Duration) -> Duration {
    let millis = delta.num_milliseconds().max(1);
    Duration::seconds((millis + 999) / 1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::test_support::{config_with_stop, fixed_solar};
    use chrono::FixedOffset;

    fn schedule(config: ScheduleConfig) -> FluxSchedule {
        FluxSchedule::new(GeoTime::new(0.0, 0.0), config, Box::new(fixed_solar())).unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_new_rejects_zero_temperature() {
        let mut config = config_with_stop(22, 0);
        config.stop_temp = 0;
        let result = FluxSchedule::new(GeoTime::new(0.0, 0.0), config, Box::new(fixed_solar()));
        assert!(matches!(result, Err(ScheduleError::InvalidSchedule(_))));
    }

    #[test]
    fn test_next_wake_crosses_night_floor_and_midnight() {
        let schedule = schedule(config_with_stop(22, 0));
        let now = at(1, 23, 0, 0);

        // Flat until 05:30 next day, then 8 one-second steps until 454 rounds to 453
        let wake = schedule.next_wake(&now).unwrap();
        assert_eq!(wake.as_secs(), 6 * 3600 + 30 * 60 + 8);

        let later = now + Duration::from_std(wake).unwrap();
        assert_eq!(schedule.color_temperature_at(&now), Ok(454));
        assert_eq!(schedule.color_temperature_at(&later), Ok(453));
    }

    #[test]
    fn test_next_wake_mid_segment() {
        let schedule = schedule(config_with_stop(22, 0));
        let now = at(1, 9, 0, 0);

        // Two scaled steps of 82s each within the sunrise-noon segment
        let wake = schedule.next_wake(&now).unwrap();
        assert_eq!(wake.as_secs(), 164);
        assert_eq!(schedule.color_temperature_at(&now), Ok(266));
        assert_eq!(
            schedule.color_temperature_at(&(now + Duration::seconds(164))),
            Ok(265)
        );
    }

    #[test]
    fn test_next_wake_never_returns_noop() {
        let schedule = schedule(config_with_stop(21, 15));
        let mut now = at(1, 0, 0, 0);
        let end = at(3, 0, 0, 0);

        while now < end {
            let wake = schedule.next_wake(&now).unwrap();
            assert!(wake.as_secs() >= 1);
            let later = now + Duration::from_std(wake).unwrap();
            assert_ne!(
                schedule.color_temperature_at(&now),
                schedule.color_temperature_at(&later),
                "no-op wake at {now}"
            );
            now = later;
        }
    }

    #[test]
    fn test_next_wake_stops_at_noon_anchor() {
        let schedule = schedule(config_with_stop(22, 0));
        let now = at(1, 11, 58, 37);

        // A scaled step of 162s would overshoot noon, so it is cut to the anchor
        let wake = schedule.next_wake(&now).unwrap();
        assert_eq!(wake.as_secs(), 83);
        assert_eq!(schedule.color_temperature_at(&now), Ok(201));
        assert_eq!(schedule.color_temperature_at(&at(1, 12, 0, 0)), Ok(200));
    }

    #[test]
    fn test_next_wake_never_sleeps_past_a_changing_anchor() {
        let schedule = schedule(config_with_stop(21, 15));
        let mut now = at(1, 0, 0, 0);
        let end = at(3, 0, 0, 0);

        while now < end {
            let initial = schedule.color_temperature_at(&now).unwrap();
            let later = now + Duration::from_std(schedule.next_wake(&now).unwrap()).unwrap();

            for anchor in schedule.table_at(&now).unwrap().anchors() {
                if now < anchor.time && anchor.time < later {
                    assert_eq!(
                        anchor.mired, initial,
                        "slept from {now} to {later} across {:?}",
                        anchor.kind
                    );
                }
            }
            now = later;
        }
    }

    #[test]
    fn test_flat_schedule_is_a_schedule_loop() {
        let mut config = config_with_stop(22, 0);
        config.sunrise_temp = 2200;
        config.solar_noon_temp = 2200;
        config.sunset_temp = 2200;

        let result = schedule(config).next_wake(&at(1, 12, 0, 0));
        assert!(matches!(result, Err(ScheduleError::ScheduleLoop { .. })));
    }

    #[test]
    fn test_works_in_non_utc_zone() {
        let schedule = schedule(config_with_stop(22, 0));
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        // 09:00 UTC expressed as 11:00 local
        let now = at(1, 9, 0, 0).with_timezone(&tz);

        assert_eq!(schedule.color_temperature_at(&now), Ok(266));
        assert_eq!(schedule.next_wake(&now).unwrap().as_secs(), 164);
    }

    #[test]
    fn test_is_daytime() {
        let schedule = schedule(config_with_stop(22, 0));
        assert_eq!(schedule.is_daytime(&at(1, 5, 59, 59)), Ok(false));
        assert_eq!(schedule.is_daytime(&at(1, 6, 0, 0)), Ok(true));
        assert_eq!(schedule.is_daytime(&at(1, 18, 0, 0)), Ok(false));
    }
}
