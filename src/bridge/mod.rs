//! Bridge client abstraction.
//!
//! A [`Bridge`] is the only way the scheduling loop talks to hardware:
//! fetch fixture state, send one batched command per change, and read and
//! rewrite scenes. The HTTP client for a real bridge lives outside this
//! crate; [`SnapshotFileBridge`] replays a JSON snapshot for dry runs.

pub mod snapshot;

use anyhow::Result;

use crate::lights::{LightCommand, LightSnapshot, Scene, SceneUpdate};

pub use snapshot::{BridgeSnapshot, SnapshotFileBridge};

#[cfg_attr(test, mockall::automock)]
pub trait Bridge: Send {
    /// Human readable name used in logs.
    fn name(&self) -> String;

    fn fetch_lights(&mut self) -> Result<Vec<LightSnapshot>>;

    /// Apply one command to every listed fixture.
    fn send_command(&mut self, command: &LightCommand, light_ids: &[String]) -> Result<()>;

    fn fetch_scenes(&mut self) -> Result<Vec<Scene>>;

    fn update_scene(&mut self, update: &SceneUpdate) -> Result<()>;
}
