//! Status records published after each cycle.

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::color::{Brightness, ColorTemperature};
use crate::common::constants::STATUS_HISTORY_LEN;
use crate::schedule::{AnchorKind, FluxSchedule, ScheduleError};

/// Target state applied by one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppliedState {
    pub brightness: Brightness,
    pub color_temperature: ColorTemperature,
    pub applied_at: DateTime<Utc>,
}

/// The last few applied states of one scheduling loop, newest last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusHistory {
    entries: VecDeque<AppliedState>,
}

impl StatusHistory {
    pub fn record(&mut self, state: AppliedState) {
        if self.entries.len() == STATUS_HISTORY_LEN {
            self.entries.pop_front();
        }
        self.entries.push_back(state);
    }

    pub fn last(&self) -> Option<&AppliedState> {
        self.entries.back()
    }

    /// Brightness applied on the previous cycle.
    pub fn last_brightness(&self) -> Option<Brightness> {
        self.last().map(|state| state.brightness)
    }

    pub fn entries(&self) -> impl Iterator<Item = &AppliedState> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Receiver of applied states, such as a status endpoint or message bus.
pub trait StatusSink: Send + Sync {
    fn publish(&self, bridge: &str, state: &AppliedState) -> Result<()>;
}

/// Writes the latest applied state of every bridge to a JSON file.
pub struct StatusFile {
    path: PathBuf,
    latest: Mutex<BTreeMap<String, AppliedState>>,
}

impl StatusFile {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            latest: Mutex::new(BTreeMap::new()),
        }
    }
}

impl StatusSink for StatusFile {
    fn publish(&self, bridge: &str, state: &AppliedState) -> Result<()> {
        let mut latest = self
            .latest
            .lock()
            .map_err(|_| anyhow::anyhow!("status file lock poisoned"))?;
        latest.insert(bridge.to_string(), *state);

        let json = serde_json::to_string_pretty(&*latest)?;
        fs::write(&self.path, json)
            .with_context(|| format!("Failed to write status file {}", self.path.display()))
    }
}

/// Point-in-time view of the schedule and the last applied state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FluxStatus {
    pub flux_color_temperature: i32,
    pub sunrise_color_temperature: i32,
    pub solar_noon_color_temperature: i32,
    pub sunset_color_temperature: i32,
    pub stop_color_temperature: i32,
    pub sunrise: DateTime<Utc>,
    pub solar_noon: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    pub stop_time: Option<DateTime<Utc>>,
    pub next_wake_seconds: u64,
    pub next_wake: DateTime<Utc>,
    pub history: Vec<AppliedState>,
}

impl FluxStatus {
    pub fn capture<Tz: TimeZone>(
        schedule: &FluxSchedule,
        now: &DateTime<Tz>,
        history: &StatusHistory,
    ) -> Result<Self, ScheduleError> {
        let table = schedule.table_at(now)?;
        let solar = table.solar_times();
        let mireds = schedule.config().mireds()?;
        let wake = schedule.next_wake(now)?;
        let now_utc = now.with_timezone(&Utc);
        let next_wake = chrono::Duration::from_std(wake)
            .ok()
            .and_then(|wake| now_utc.checked_add_signed(wake))
            .unwrap_or(now_utc);

        Ok(Self {
            flux_color_temperature: table.color_temperature_at(now_utc)?,
            sunrise_color_temperature: mireds.sunrise,
            solar_noon_color_temperature: mireds.solar_noon,
            sunset_color_temperature: mireds.sunset,
            stop_color_temperature: mireds.stop,
            sunrise: solar.sunrise,
            solar_noon: solar.solar_noon,
            sunset: solar.sunset,
            stop_time: table.anchor(AnchorKind::Stop).map(|anchor| anchor.time),
            next_wake_seconds: wake.as_secs(),
            next_wake,
            history: history.entries().copied().collect(),
        })
    }
}
