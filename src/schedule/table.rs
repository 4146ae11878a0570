//! Anchor table construction, bracketing and linear interpolation.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use super::{GeoTime, ScheduleConfig, ScheduleError, SolarCalculator, SolarTimes};
use crate::common::constants::NIGHT_FLOOR_LEAD_MINUTES;

/// Which schedule event an anchor stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorKind {
    NightFloor,
    Sunrise,
    SolarNoon,
    Sunset,
    Stop,
}

impl AnchorKind {
    pub fn label(self) -> &'static str {
        match self {
            AnchorKind::NightFloor => "Night floor",
            AnchorKind::Sunrise => "Sunrise",
            AnchorKind::SolarNoon => "Solar noon",
            AnchorKind::Sunset => "Sunset",
            AnchorKind::Stop => "Stop",
        }
    }
}

/// A (time, color temperature) pair marking one schedule event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnchorPoint {
    pub kind: AnchorKind,
    pub time: DateTime<Utc>,
    pub mired: i32,
}

impl AnchorPoint {
    pub fn new(kind: AnchorKind, time: DateTime<Utc>, mired: i32) -> Self {
        Self {
            kind,
            time: whole_seconds(time),
            mired,
        }
    }

    fn shifted(self, delta: Duration) -> Self {
        Self {
            time: self.time + delta,
            ..self
        }
    }
}

/// Sorted anchors for one local calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleTable {
    date: NaiveDate,
    anchors: Vec<AnchorPoint>,
    solar: SolarTimes,
}

impl ScheduleTable {
    /// Build the table for `date` as observed in `tz`.
    pub fn build<Tz: TimeZone>(
        date: NaiveDate,
        tz: &Tz,
        geo: GeoTime,
        config: &ScheduleConfig,
        solar: &dyn SolarCalculator,
    ) -> Result<Self, ScheduleError> {
        let mireds = config.mireds()?;
        let solar = solar.solar_times(date, geo)?;
        let stop = local_instant(tz, date.and_time(config.stop_time))?;

        let mut anchors = Vec::with_capacity(5);
        insert_sorted(
            &mut anchors,
            AnchorPoint::new(AnchorKind::Sunrise, solar.sunrise, mireds.sunrise),
        );
        insert_sorted(
            &mut anchors,
            AnchorPoint::new(AnchorKind::SolarNoon, solar.solar_noon, mireds.solar_noon),
        );
        insert_sorted(
            &mut anchors,
            AnchorPoint::new(AnchorKind::Stop, stop, mireds.stop),
        );
        // No evening segment when the stop time preempts sunset
        if solar.sunset < stop {
            insert_sorted(
                &mut anchors,
                AnchorPoint::new(AnchorKind::Sunset, solar.sunset, mireds.sunset),
            );
        }
        insert_sorted(
            &mut anchors,
            AnchorPoint::new(
                AnchorKind::NightFloor,
                solar.sunrise - Duration::minutes(NIGHT_FLOOR_LEAD_MINUTES),
                mireds.stop,
            ),
        );

        Self::from_sorted(date, anchors, solar)
    }

    fn from_sorted(
        date: NaiveDate,
        anchors: Vec<AnchorPoint>,
        solar: SolarTimes,
    ) -> Result<Self, ScheduleError> {
        if let Some(pair) = anchors.windows(2).find(|pair| pair[0].time >= pair[1].time) {
            return Err(ScheduleError::invalid(format!(
                "{} and {} anchors share the instant {}",
                pair[0].kind.label(),
                pair[1].kind.label(),
                pair[1].time
            )));
        }

        Ok(Self {
            date,
            anchors,
            solar,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn anchors(&self) -> &[AnchorPoint] {
        &self.anchors
    }

    pub fn solar_times(&self) -> SolarTimes {
        self.solar
    }

    pub fn anchor(&self, kind: AnchorKind) -> Option<&AnchorPoint> {
        self.anchors.iter().find(|anchor| anchor.kind == kind)
    }

    /// Anchor pair `(A, B)` with `A.time <= now < B.time`, wrapping across
    /// midnight by shifting the last/first anchor a full day.
    pub fn bracket(&self, now: DateTime<Utc>) -> (AnchorPoint, AnchorPoint) {
        let first = self.anchors[0];
        let last = self.anchors[self.anchors.len() - 1];

        if now < first.time {
            return (last.shifted(-Duration::days(1)), first);
        }
        if now >= last.time {
            return (last, first.shifted(Duration::days(1)));
        }

        let next = self
            .anchors
            .iter()
            .position(|anchor| anchor.time > now)
            .unwrap_or(self.anchors.len() - 1);
        (self.anchors[next - 1], self.anchors[next])
    }

    /// Interpolated mired value at `now`.
    pub fn color_temperature_at(&self, now: DateTime<Utc>) -> Result<i32, ScheduleError> {
        let (a, b) = self.bracket(now);
        interpolate(&a, &b, now)
    }
}

/// Linear interpolation between two anchors, rounded half to even.
pub fn interpolate(
    a: &AnchorPoint,
    b: &AnchorPoint,
    now: DateTime<Utc>,
) -> Result<i32, ScheduleError> {
    if a.time == b.time {
        return Err(ScheduleError::invalid(format!(
            "zero-width bracket at {}",
            a.time
        )));
    }
    if a.time > b.time {
        return Err(ScheduleError::invalid(format!(
            "bracket start {} is after its end {}",
            a.time, b.time
        )));
    }

    let range = f64::from((b.mired - a.mired).abs());
    let fraction = seconds(now - a.time) / seconds(b.time - a.time);
    let result = if a.mired > b.mired {
        f64::from(a.mired) - range * fraction
    } else {
        f64::from(a.mired) + range * fraction
    };

    Ok(result.round_ties_even() as i32)
}

pub(crate) fn seconds(delta: Duration) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}

fn whole_seconds(time: DateTime<Utc>) -> DateTime<Utc> {
    time - Duration::nanoseconds(i64::from(time.timestamp_subsec_nanos()))
}

// Insert before the first strictly later anchor, so ties keep insertion order
fn insert_sorted(anchors: &mut Vec<AnchorPoint>, anchor: AnchorPoint) {
    let index = anchors
        .iter()
        .position(|existing| existing.time > anchor.time)
        .unwrap_or(anchors.len());
    anchors.insert(index, anchor);
}

fn local_instant<Tz: TimeZone>(
    tz: &Tz,
    naive: NaiveDateTime,
) -> Result<DateTime<Utc>, ScheduleError> {
    tz.from_local_datetime(&naive)
        .earliest()
        // A stop time inside a DST gap moves to the first valid instant after it
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|time| time.with_timezone(&Utc))
        .ok_or_else(|| ScheduleError::invalid(format!("local time {naive} does not exist")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::test_support::{config_with_stop, fixed_solar};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        date().and_hms_opt(hour, minute, second).unwrap().and_utc()
    }

    fn table(stop_hour: u32, stop_minute: u32) -> ScheduleTable {
        ScheduleTable::build(
            date(),
            &Utc,
            GeoTime::new(0.0, 0.0),
            &config_with_stop(stop_hour, stop_minute),
            &fixed_solar(),
        )
        .unwrap()
    }

    #[test]
    fn test_anchor_order_and_values() {
        let table = table(22, 0);
        let summary: Vec<_> = table
            .anchors()
            .iter()
            .map(|anchor| (anchor.kind, anchor.time, anchor.mired))
            .collect();

        assert_eq!(
            summary,
            vec![
                (AnchorKind::NightFloor, at(5, 30, 0), 454),
                (AnchorKind::Sunrise, at(6, 0, 0), 333),
                (AnchorKind::SolarNoon, at(12, 0, 0), 200),
                (AnchorKind::Sunset, at(18, 0, 0), 370),
                (AnchorKind::Stop, at(22, 0, 0), 454),
            ]
        );
    }

    #[test]
    fn test_sunset_omitted_when_stop_time_comes_first() {
        let table = table(17, 0);
        assert!(table.anchor(AnchorKind::Sunset).is_none());
        assert_eq!(table.anchors().len(), 4);
        assert_eq!(table.anchors()[3].time, at(17, 0, 0));
    }

    #[test]
    fn test_sunset_omitted_when_equal_to_stop_time() {
        let table = table(18, 0);
        assert!(table.anchor(AnchorKind::Sunset).is_none());
    }

    #[test]
    fn test_duplicate_anchor_times_rejected() {
        // Stop at sunrise collides with the sunrise anchor
        let result = ScheduleTable::build(
            date(),
            &Utc,
            GeoTime::new(0.0, 0.0),
            &config_with_stop(6, 0),
            &fixed_solar(),
        );
        assert!(matches!(result, Err(ScheduleError::InvalidSchedule(_))));
    }

    #[test]
    fn test_anchor_times_truncated_to_whole_seconds() {
        let anchor = AnchorPoint::new(
            AnchorKind::Sunrise,
            at(6, 0, 0) + Duration::milliseconds(750),
            333,
        );
        assert_eq!(anchor.time, at(6, 0, 0));
    }

    #[test]
    fn test_bracket_inside_day() {
        let table = table(22, 0);
        let (a, b) = table.bracket(at(9, 0, 0));
        assert_eq!((a.kind, b.kind), (AnchorKind::Sunrise, AnchorKind::SolarNoon));

        // Exactly on an anchor belongs to the segment it starts
        let (a, b) = table.bracket(at(12, 0, 0));
        assert_eq!((a.kind, b.kind), (AnchorKind::SolarNoon, AnchorKind::Sunset));
    }

    #[test]
    fn test_bracket_wraps_before_first_anchor() {
        let table = table(22, 0);
        let (a, b) = table.bracket(at(3, 0, 0));
        assert_eq!(a.kind, AnchorKind::Stop);
        assert_eq!(a.time, at(22, 0, 0) - Duration::days(1));
        assert_eq!(b.time, at(5, 30, 0));

        let (a, _) = table.bracket(at(5, 29, 59));
        assert_eq!(a.kind, AnchorKind::Stop);
    }

    #[test]
    fn test_bracket_wraps_after_last_anchor() {
        let table = table(22, 0);
        let (a, b) = table.bracket(at(22, 0, 0));
        assert_eq!(a.time, at(22, 0, 0));
        assert_eq!(b.kind, AnchorKind::NightFloor);
        assert_eq!(b.time, at(5, 30, 0) + Duration::days(1));
    }

    #[test]
    fn test_interpolate_midpoint_rounds_half_to_even() {
        let a = AnchorPoint::new(AnchorKind::Sunrise, at(6, 0, 0), 333);
        let b = AnchorPoint::new(AnchorKind::SolarNoon, at(12, 0, 0), 200);
        // 333 - 133 * 0.5 = 266.5
        assert_eq!(interpolate(&a, &b, at(9, 0, 0)), Ok(266));
    }

    #[test]
    fn test_interpolate_increasing_segment() {
        let a = AnchorPoint::new(AnchorKind::SolarNoon, at(12, 0, 0), 200);
        let b = AnchorPoint::new(AnchorKind::Sunset, at(18, 0, 0), 370);
        assert_eq!(interpolate(&a, &b, at(12, 0, 0)), Ok(200));
        assert_eq!(interpolate(&a, &b, at(15, 0, 0)), Ok(285));
        assert_eq!(interpolate(&a, &b, at(18, 0, 0)), Ok(370));
    }

    #[test]
    fn test_interpolate_rejects_degenerate_brackets() {
        let a = AnchorPoint::new(AnchorKind::Sunrise, at(6, 0, 0), 333);
        let same = AnchorPoint::new(AnchorKind::SolarNoon, at(6, 0, 0), 200);
        let earlier = AnchorPoint::new(AnchorKind::NightFloor, at(5, 30, 0), 454);

        assert!(matches!(
            interpolate(&a, &same, at(6, 0, 0)),
            Err(ScheduleError::InvalidSchedule(_))
        ));
        assert!(matches!(
            interpolate(&a, &earlier, at(6, 0, 0)),
            Err(ScheduleError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn test_color_temperature_across_the_day() {
        let table = table(22, 0);
        assert_eq!(table.color_temperature_at(at(2, 0, 0)), Ok(454));
        assert_eq!(table.color_temperature_at(at(5, 45, 0)), Ok(394));
        assert_eq!(table.color_temperature_at(at(12, 0, 0)), Ok(200));
        assert_eq!(table.color_temperature_at(at(20, 0, 0)), Ok(412));
        assert_eq!(table.color_temperature_at(at(23, 59, 59)), Ok(454));
    }
}
