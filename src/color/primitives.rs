//! Clamped value types for device color temperature and brightness.
//!
//! Both types clamp on construction and only convert through explicit
//! accessors, so a value that reaches a bridge command is always in range.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::conversion::{Rgb, black_body_rgb, rgb_to_xy};
use crate::common::constants::{
    MAX_BRIGHTNESS, MAX_COLOR_TEMPERATURE, MIN_BRIGHTNESS, MIN_COLOR_TEMPERATURE,
};

/// Device color temperature in mired, clamped to `[154, 500]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColorTemperature(i32);

impl ColorTemperature {
    pub fn new(mired: i32) -> Self {
        Self(mired.clamp(MIN_COLOR_TEMPERATURE, MAX_COLOR_TEMPERATURE))
    }

    pub fn mired(self) -> i32 {
        self.0
    }

    pub fn kelvin(self) -> f64 {
        1_000_000.0 / f64::from(self.0)
    }

    pub fn rgb(self) -> Rgb {
        black_body_rgb(self.kelvin())
    }

    /// Device XY chromaticity of this temperature.
    pub fn xy(self) -> [f64; 2] {
        rgb_to_xy(self.rgb())
    }
}

impl fmt::Display for ColorTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ColorTemperature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for ColorTemperature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i32::deserialize(deserializer).map(ColorTemperature::new)
    }
}

/// Raw device brightness, clamped to `[0, 254]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Brightness(u8);

impl Brightness {
    pub const MAX: Brightness = Brightness(MAX_BRIGHTNESS as u8);

    pub fn new(value: i32) -> Self {
        Self(value.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Brightness {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for Brightness {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i32::deserialize(deserializer).map(Brightness::new)
    }
}
