//! Dry-run bridge backed by a JSON snapshot file.
//!
//! The snapshot is loaded once; commands and scene updates are applied to
//! the in-memory copy so later cycles observe them, but the file on disk is
//! never rewritten.
//!
//! ```json
//! {
//!   "lights": [
//!     { "id": "1", "name": "Living Room 1", "type": "white_ambiance",
//!       "on": true, "brightness": 128, "color_mode": "ct", "color_temperature": 454 }
//!   ],
//!   "scenes": [
//!     { "id": "s1", "name": "Evening Flux",
//!       "actions": [{ "target": "1", "color_temperature": 400 }] }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::Bridge;
use crate::lights::{ColorMode, LightCommand, LightSnapshot, Scene, SceneUpdate};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeSnapshot {
    #[serde(default)]
    pub lights: Vec<LightSnapshot>,
    #[serde(default)]
    pub scenes: Vec<Scene>,
}

impl BridgeSnapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read bridge snapshot {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse bridge snapshot {}", path.display()))
    }
}

pub struct SnapshotFileBridge {
    name: String,
    snapshot: BridgeSnapshot,
    debug_enabled: bool,
}

impl SnapshotFileBridge {
    pub fn open(path: &Path, debug_enabled: bool) -> Result<Self> {
        let snapshot = BridgeSnapshot::load(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_snapshot(name, snapshot, debug_enabled))
    }

    pub fn from_snapshot(
        name: impl Into<String>,
        snapshot: BridgeSnapshot,
        debug_enabled: bool,
    ) -> Self {
        Self {
            name: name.into(),
            snapshot,
            debug_enabled,
        }
    }

    pub fn snapshot(&self) -> &BridgeSnapshot {
        &self.snapshot
    }
}

impl Bridge for SnapshotFileBridge {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn fetch_lights(&mut self) -> Result<Vec<LightSnapshot>> {
        Ok(self.snapshot.lights.clone())
    }

    fn send_command(&mut self, command: &LightCommand, light_ids: &[String]) -> Result<()> {
        for light in self
            .snapshot
            .lights
            .iter_mut()
            .filter(|light| light_ids.contains(&light.id))
        {
            if let Some(brightness) = command.change.brightness() {
                light.brightness = brightness;
            }
            if let Some(ct) = command.change.color_temperature() {
                light.color_temperature = Some(ct);
                light.color_mode = ColorMode::Ct;
                light.color_xy = None;
            }
        }

        if self.debug_enabled {
            log_indented!(
                "[{}] {:?} -> {} light(s)",
                self.name,
                command.change,
                light_ids.len()
            );
        }
        Ok(())
    }

    fn fetch_scenes(&mut self) -> Result<Vec<Scene>> {
        Ok(self.snapshot.scenes.clone())
    }

    fn update_scene(&mut self, update: &SceneUpdate) -> Result<()> {
        let scene = self
            .snapshot
            .scenes
            .iter_mut()
            .find(|scene| scene.id == update.scene_id)
            .with_context(|| format!("Scene '{}' not found", update.scene_id))?;
        scene.actions = update.actions.clone();
        scene.speed = update.speed;
        Ok(())
    }
}
