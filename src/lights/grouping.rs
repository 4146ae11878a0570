//! Light command batching.
//!
//! Fixtures are first grouped by logical name so that the bulbs of one lamp
//! share a brightness decision. Each group picks a consensus brightness, and
//! every `on` fixture that differs from the target on some axis is placed
//! under the [`LightChange`] describing exactly what it needs. Fixtures that
//! need the same change share one bridge command.

use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::{ColorMode, LightControls, LightSnapshot};
use crate::color::conversion::xy_distance;
use crate::color::{Brightness, ColorTemperature};
use crate::common::constants::{NEAR_MAX_BRIGHTNESS, XY_MAX_DIFF, XY_MIN_DIFF};

/// What a command changes. There is no "nothing" variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LightChange {
    Temperature(ColorTemperature),
    Brightness(Brightness),
    TemperatureAndBrightness(ColorTemperature, Brightness),
}

impl LightChange {
    /// Build a change from the per-axis needs, `None` when neither axis changes.
    pub fn from_parts(
        color_temperature: Option<ColorTemperature>,
        brightness: Option<Brightness>,
    ) -> Option<Self> {
        match (color_temperature, brightness) {
            (Some(ct), Some(b)) => Some(LightChange::TemperatureAndBrightness(ct, b)),
            (Some(ct), None) => Some(LightChange::Temperature(ct)),
            (None, Some(b)) => Some(LightChange::Brightness(b)),
            (None, None) => None,
        }
    }

    pub fn color_temperature(self) -> Option<ColorTemperature> {
        match self {
            LightChange::Temperature(ct) | LightChange::TemperatureAndBrightness(ct, _) => Some(ct),
            LightChange::Brightness(_) => None,
        }
    }

    pub fn brightness(self) -> Option<Brightness> {
        match self {
            LightChange::Brightness(b) | LightChange::TemperatureAndBrightness(_, b) => Some(b),
            LightChange::Temperature(_) => None,
        }
    }
}

/// One outbound bridge command. Equality ignores the transition, which is
/// shared by every command of a cycle.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LightCommand {
    pub change: LightChange,
    pub transition: Duration,
}

impl PartialEq for LightCommand {
    fn eq(&self, other: &Self) -> bool {
        self.change == other.change
    }
}

impl Eq for LightCommand {}

/// Fixture ids per distinct change, built fresh each cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandGroups {
    transition: Duration,
    groups: BTreeMap<LightChange, Vec<String>>,
}

impl CommandGroups {
    pub fn new(transition: Duration) -> Self {
        Self {
            transition,
            groups: BTreeMap::new(),
        }
    }

    fn push(&mut self, change: LightChange, id: &str) {
        self.groups.entry(change).or_default().push(id.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of distinct commands.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Total fixtures touched across all commands.
    pub fn light_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn get(&self, change: &LightChange) -> Option<&[String]> {
        self.groups.get(change).map(Vec::as_slice)
    }

    pub fn transition(&self) -> Duration {
        self.transition
    }

    pub fn iter(&self) -> impl Iterator<Item = (LightCommand, &[String])> + '_ {
        self.groups.iter().map(|(change, ids)| {
            (
                LightCommand {
                    change: *change,
                    transition: self.transition,
                },
                ids.as_slice(),
            )
        })
    }
}

/// Decides which fixtures need which command for a target state.
#[derive(Debug, Clone, Default)]
pub struct LightCommandGrouper {
    controls: LightControls,
}

impl LightCommandGrouper {
    pub fn new(controls: LightControls) -> Self {
        Self { controls }
    }

    pub fn controls(&self) -> &LightControls {
        &self.controls
    }

    /// Partition `lights` into the minimal set of commands reaching
    /// `(target_temp, target_brightness)`.
    ///
    /// `last_known_brightness` is the brightness hueflux applied on its
    /// previous cycle; a group whose consensus brightness differs from it is
    /// considered user-adjusted and keeps its own brightness.
    pub fn group(
        &self,
        lights: &[LightSnapshot],
        target_temp: ColorTemperature,
        target_brightness: Brightness,
        last_known_brightness: Brightness,
        transition: Duration,
    ) -> CommandGroups {
        let mut groups = CommandGroups::new(transition);
        let target_xy = target_temp.xy();

        let mut by_key: BTreeMap<&str, Vec<&LightSnapshot>> = BTreeMap::new();
        for light in lights
            .iter()
            .filter(|light| light.on && self.controls.get(&light.name).is_flux_controlled())
        {
            by_key.entry(light.group_key()).or_default().push(light);
        }

        for members in by_key.values() {
            let Some(common) = common_brightness(members, last_known_brightness) else {
                continue;
            };
            let brightness_to_set =
                brightness_to_set(common, target_brightness, last_known_brightness);

            for light in members {
                let control = self.controls.get(&light.name);

                let need_brightness = control.brightness && light.brightness != brightness_to_set;
                let need_color_temp =
                    control.temperature && needs_color_temperature(light, target_temp, target_xy);

                let change = LightChange::from_parts(
                    need_color_temp.then_some(target_temp),
                    need_brightness.then_some(brightness_to_set),
                );
                if let Some(change) = change {
                    groups.push(change, &light.id);
                }
            }
        }

        groups
    }
}

/// Consensus brightness of a group's `on` members.
///
/// Precedence, each a tie-break of the previous: non-zero, equal to
/// `last_known`, most frequent, numerically highest.
pub fn common_brightness(
    members: &[&LightSnapshot],
    last_known: Brightness,
) -> Option<Brightness> {
    let mut counts: BTreeMap<Brightness, usize> = BTreeMap::new();
    for member in members {
        *counts.entry(member.brightness).or_default() += 1;
    }

    counts
        .into_iter()
        .max_by_key(|&(brightness, count)| {
            (brightness.value() != 0, brightness == last_known, count, brightness)
        })
        .map(|(brightness, _)| brightness)
}

/// Brightness a group should end up at.
///
/// The target applies when the group still follows the scheduler, is
/// saturated near device max, or reports zero; otherwise the group's own
/// consensus is kept.
pub fn brightness_to_set(
    common: Brightness,
    target: Brightness,
    last_known: Brightness,
) -> Brightness {
    if common == last_known || common.value() >= NEAR_MAX_BRIGHTNESS || common.value() == 0 {
        target
    } else {
        common
    }
}

fn needs_color_temperature(
    light: &LightSnapshot,
    target: ColorTemperature,
    target_xy: [f64; 2],
) -> bool {
    let Some(range) = light.light_type.color_temperature_range() else {
        return false;
    };

    match light.color_mode {
        ColorMode::Xy => light.color_xy.is_some_and(|xy| {
            let diff = xy_distance(xy, target_xy);
            XY_MIN_DIFF < diff && diff < XY_MAX_DIFF
        }),
        ColorMode::Hs => false,
        ColorMode::Ct | ColorMode::None => {
            light.color_temperature != Some(target) && range.contains(&target.mired())
        }
    }
}
