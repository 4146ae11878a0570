//! Color math: clamped device primitives and pure color-space conversions.

pub mod conversion;
pub mod primitives;

pub use conversion::{ColorError, Hsv, Rgb};
pub use primitives::{Brightness, ColorTemperature};
