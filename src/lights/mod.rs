//! Light fixture snapshots and the decisions made about them each cycle.
//!
//! - `grouping`: partitions fixtures into the minimal set of bridge commands
//! - `controls`: per-fixture overrides for which axes hueflux may touch
//! - `scenes`: retargets "flux" scenes to the current color temperature
//! - `brightness`: light-level driven brightness policy

pub mod brightness;
pub mod controls;
pub mod grouping;
pub mod scenes;

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::color::{Brightness, ColorTemperature};
use crate::common::constants::{
    MAX_COLOR_TEMPERATURE, MAX_WHITE_AMBIANCE_COLOR_TEMPERATURE, MIN_COLOR_TEMPERATURE,
};

pub use brightness::BrightnessPolicy;
pub use controls::{LightControl, LightControls};
pub use grouping::{CommandGroups, LightChange, LightCommand, LightCommandGrouper};
pub use scenes::{Scene, SceneAction, SceneUpdate, plan_scene_updates};

/// Fixture capability class as reported by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightType {
    WhiteOnly,
    WhiteAmbiance,
    Color,
}

impl LightType {
    /// Allowed mired range, `None` when color control is unsupported.
    pub fn color_temperature_range(self) -> Option<RangeInclusive<i32>> {
        match self {
            LightType::WhiteOnly => None,
            LightType::WhiteAmbiance => {
                Some(MIN_COLOR_TEMPERATURE..=MAX_WHITE_AMBIANCE_COLOR_TEMPERATURE)
            }
            LightType::Color => Some(MIN_COLOR_TEMPERATURE..=MAX_COLOR_TEMPERATURE),
        }
    }
}

/// Which representation currently drives a fixture's color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    None,
    Ct,
    Xy,
    Hs,
}

/// Last bridge-reported state of one fixture. Read-only to the scheduling core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightSnapshot {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub light_type: LightType,
    #[serde(default)]
    pub on: bool,
    #[serde(default)]
    pub brightness: Brightness,
    #[serde(default)]
    pub color_mode: ColorMode,
    #[serde(default)]
    pub color_temperature: Option<ColorTemperature>,
    #[serde(default)]
    pub color_xy: Option<[f64; 2]>,
    #[serde(default)]
    pub hue: Option<u16>,
    #[serde(default)]
    pub saturation: Option<u8>,
}

impl LightSnapshot {
    /// Bare fixture with only identity and type; everything else defaulted.
    pub fn new(id: impl Into<String>, name: impl Into<String>, light_type: LightType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            light_type,
            on: false,
            brightness: Brightness::default(),
            color_mode: ColorMode::None,
            color_temperature: None,
            color_xy: None,
            hue: None,
            saturation: None,
        }
    }

    /// Logical group key: the name without its trailing whitespace-delimited token.
    ///
    /// "Living Room 1" groups as "Living Room"; "Desk" stays "Desk".
    pub fn group_key(&self) -> &str {
        let name = self.name.trim_end();
        match name.rsplit_once(char::is_whitespace) {
            Some((head, _)) if !head.trim_end().is_empty() => head.trim_end(),
            _ => name,
        }
    }
}
