//! Scene retargeting for bridge scenes marked as "flux" scenes.
//!
//! Wall switches recall scenes, so a scene stored hours ago would bring the
//! lights back at a stale temperature. Any scene whose name contains "flux"
//! (case-insensitive) gets its color temperature actions moved to the
//! current target.

use serde::{Deserialize, Serialize};

use crate::color::{Brightness, ColorTemperature};
use crate::common::constants::FLUX_SCENE_MARKER;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneAction {
    /// Fixture id the action applies to.
    pub target: String,
    #[serde(default)]
    pub on: Option<bool>,
    #[serde(default)]
    pub brightness: Option<Brightness>,
    #[serde(default)]
    pub color_temperature: Option<ColorTemperature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub actions: Vec<SceneAction>,
}

impl Scene {
    pub fn is_flux_scene(&self) -> bool {
        self.name.to_lowercase().contains(FLUX_SCENE_MARKER)
    }
}

/// Replacement actions for one scene.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneUpdate {
    pub scene_id: String,
    pub scene_name: String,
    pub speed: Option<f64>,
    pub actions: Vec<SceneAction>,
}

/// Updates for every flux scene with a color temperature action that differs
/// from `target`, ordered by scene name.
pub fn plan_scene_updates(scenes: &[Scene], target: ColorTemperature) -> Vec<SceneUpdate> {
    let mut flux_scenes: Vec<&Scene> =
        scenes.iter().filter(|scene| scene.is_flux_scene()).collect();
    flux_scenes.sort_by(|a, b| a.name.cmp(&b.name));

    flux_scenes
        .into_iter()
        .filter(|scene| {
            scene
                .actions
                .iter()
                .any(|action| action.color_temperature.is_some_and(|ct| ct != target))
        })
        .map(|scene| SceneUpdate {
            scene_id: scene.id.clone(),
            scene_name: scene.name.clone(),
            speed: scene.speed,
            actions: scene
                .actions
                .iter()
                .map(|action| SceneAction {
                    color_temperature: action.color_temperature.map(|_| target),
                    ..action.clone()
                })
                .collect(),
        })
        .collect()
}
