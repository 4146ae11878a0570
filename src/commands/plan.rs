//! Plan command: show the commands one cycle would send for a bridge snapshot.

use anyhow::Result;
use std::path::Path;

use crate::bridge::BridgeSnapshot;
use crate::color::{Brightness, ColorTemperature};
use crate::config::Config;
use crate::lights::{CommandGroups, LightCommandGrouper, SceneUpdate, plan_scene_updates};
use crate::time_source::Clock;

/// Commands and scene updates computed for one snapshot.
pub struct CyclePlan {
    pub color_temperature: ColorTemperature,
    pub brightness: Brightness,
    pub groups: CommandGroups,
    pub scene_updates: Vec<SceneUpdate>,
}

/// Compute a plan for `snapshot` at the clock's current time.
///
/// `brightness` defaults to the configured policy without a sensor reading;
/// `last_brightness` defaults to the target, as on a first cycle.
pub fn plan_cycle(
    config: &Config,
    snapshot: &BridgeSnapshot,
    clock: &dyn Clock,
    brightness: Option<u8>,
    last_brightness: Option<u8>,
) -> Result<CyclePlan> {
    let schedule = super::build_schedule(config)?;
    let now = clock.now();

    let color_temperature = ColorTemperature::new(schedule.color_temperature_at(&now)?);
    let brightness = match brightness {
        Some(value) => Brightness::new(i32::from(value)),
        None => config
            .brightness_policy()
            .brightness_for(None, schedule.is_daytime(&now)?),
    };
    let last_known = last_brightness
        .map(|value| Brightness::new(i32::from(value)))
        .unwrap_or(brightness);

    let grouper = LightCommandGrouper::new(config.light_controls());
    let groups = grouper.group(
        &snapshot.lights,
        color_temperature,
        brightness,
        last_known,
        schedule.config().transition,
    );
    let scene_updates = plan_scene_updates(&snapshot.scenes, color_temperature);

    Ok(CyclePlan {
        color_temperature,
        brightness,
        groups,
        scene_updates,
    })
}

pub fn handle_plan_command(
    config: &Config,
    snapshot_path: &Path,
    clock: &dyn Clock,
    brightness: Option<u8>,
    last_brightness: Option<u8>,
) -> Result<()> {
    let snapshot = BridgeSnapshot::load(snapshot_path)?;
    let plan = plan_cycle(config, &snapshot, clock, brightness, last_brightness)?;

    log_block_start!(
        "Target: {} mired ({:.0}K), brightness {}",
        plan.color_temperature.mired(),
        plan.color_temperature.kelvin(),
        plan.brightness.value()
    );

    if plan.groups.is_empty() {
        log_decorated!("All {} light(s) are up to date", snapshot.lights.len());
    } else {
        log_decorated!(
            "{} command(s) for {} light(s), transition {}s",
            plan.groups.len(),
            plan.groups.light_count(),
            plan.groups.transition().as_secs()
        );
        for (command, light_ids) in plan.groups.iter() {
            let names: Vec<&str> = light_ids
                .iter()
                .map(|id| {
                    snapshot
                        .lights
                        .iter()
                        .find(|light| &light.id == id)
                        .map_or(id.as_str(), |light| light.name.as_str())
                })
                .collect();
            log_indented!("{:?}: {}", command.change, names.join(", "));
        }
    }

    for update in &plan.scene_updates {
        log_decorated!(
            "Scene '{}': {} action(s) retargeted",
            update.scene_name,
            update.actions.len()
        );
    }

    log_end!();
    Ok(())
}
