//! Per-fixture overrides for which axes the scheduler may change.

use std::collections::HashMap;

/// Axes hueflux may drive for one fixture. Both default to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightControl {
    pub brightness: bool,
    pub temperature: bool,
}

impl Default for LightControl {
    fn default() -> Self {
        Self {
            brightness: true,
            temperature: true,
        }
    }
}

impl LightControl {
    /// A fixture is flux controlled when at least one axis is enabled.
    pub fn is_flux_controlled(self) -> bool {
        self.brightness || self.temperature
    }
}

/// Override table keyed by fixture name, matched case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightControls {
    by_name: HashMap<String, LightControl>,
}

impl LightControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, control: LightControl) {
        self.by_name.insert(name.to_lowercase(), control);
    }

    pub fn with(mut self, name: &str, control: LightControl) -> Self {
        self.insert(name, control);
        self
    }

    pub fn get(&self, name: &str) -> LightControl {
        self.by_name
            .get(&name.to_lowercase())
            .copied()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
