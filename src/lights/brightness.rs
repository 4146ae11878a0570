//! Mapping from an ambient light-level reading to a target brightness.
//!
//! Light levels are the raw motion-sensor scale (roughly `10000 * log10(lux) + 1`):
//! about 10000 for a dimmed room, 25500 for a reading light, 40000+ for daylight.
//! During the day a brighter room gets dimmer lights; at night lights run at
//! the configured maximum.

use crate::color::Brightness;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessPolicy {
    pub min_brightness: u8,
    pub max_brightness: u8,
    pub min_light_level: f64,
    pub max_light_level: f64,
}

impl BrightnessPolicy {
    /// Target brightness for an optional sensor reading.
    ///
    /// Without a reading, or outside daylight hours, this is `max_brightness`.
    pub fn brightness_for(&self, light_level: Option<f64>, is_daytime: bool) -> Brightness {
        match light_level {
            Some(level) if is_daytime => self.daytime_brightness(level),
            _ => Brightness::new(i32::from(self.max_brightness)),
        }
    }

    fn daytime_brightness(&self, light_level: f64) -> Brightness {
        let above_min = light_level - self.min_light_level;
        let span = (self.max_light_level - self.min_light_level).max(above_min);
        let percent = if span > 0.0 {
            (above_min / span).max(0.0)
        } else {
            0.0
        };

        let min = f64::from(self.min_brightness);
        let max = f64::from(self.max_brightness);
        Brightness::new((min + (max - min) * (1.0 - percent)).floor() as i32)
    }
}
