//! Pure conversions between mired, Kelvin, RGB, device XY chromaticity and HSV.
//!
//! The black-body approximation follows the usual curve fit over the
//! 1000K-40000K range. XY projection gamma-corrects the RGB triple and maps
//! it through the wide-gamut D65 matrix used by Hue-style bridges.

use std::fmt;

/// Input validation failures for color conversions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorError {
    /// Mired values must be strictly positive.
    NonPositiveMired(i32),
    /// Kelvin values must be strictly positive.
    ZeroKelvin,
}

impl fmt::Display for ColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorError::NonPositiveMired(mired) => {
                write!(f, "color temperature must be a positive mired value (got {mired})")
            }
            ColorError::ZeroKelvin => {
                write!(f, "color temperature must be a positive Kelvin value")
            }
        }
    }
}

impl std::error::Error for ColorError {}

/// RGB triple with each channel in `0.0..=255.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// HSV triple: hue in degrees `0.0..360.0`, saturation and value in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

/// `mired = floor(1_000_000 / kelvin)`.
pub fn kelvin_to_mired(kelvin: u32) -> Result<i32, ColorError> {
    if kelvin == 0 {
        return Err(ColorError::ZeroKelvin);
    }
    Ok((1_000_000 / kelvin) as i32)
}

pub fn mired_to_kelvin(mired: i32) -> Result<f64, ColorError> {
    if mired <= 0 {
        return Err(ColorError::NonPositiveMired(mired));
    }
    Ok(1_000_000.0 / f64::from(mired))
}

pub fn mired_to_rgb(mired: i32) -> Result<Rgb, ColorError> {
    mired_to_kelvin(mired).map(black_body_rgb)
}

// Infallible for any positive Kelvin value
pub(crate) fn black_body_rgb(kelvin: f64) -> Rgb {
    let temp = kelvin / 100.0;

    let r = if temp <= 66.0 {
        255.0
    } else {
        329.698727446 * (temp - 60.0).powf(-0.1332047592)
    };

    let g = if temp <= 66.0 {
        99.4708025861 * temp.ln() - 161.1195681661
    } else {
        288.1221695283 * (temp - 60.0).powf(-0.0755148492)
    };

    let b = if temp >= 66.0 {
        255.0
    } else if temp <= 19.0 {
        0.0
    } else {
        138.5177312231 * (temp - 10.0).ln() - 305.0447927307
    };

    Rgb {
        r: r.clamp(0.0, 255.0),
        g: g.clamp(0.0, 255.0),
        b: b.clamp(0.0, 255.0),
    }
}

fn gamma_correct(channel: f64) -> f64 {
    let normalized = channel / 255.0;
    if normalized > 0.04045 {
        ((normalized + 0.055) / 1.055).powf(2.4)
    } else {
        normalized / 12.92
    }
}

/// Project an RGB color onto device XY chromaticity coordinates.
///
/// Pure black returns `[0.0, 0.0]`.
pub fn rgb_to_xy(rgb: Rgb) -> [f64; 2] {
    let r = gamma_correct(rgb.r);
    let g = gamma_correct(rgb.g);
    let b = gamma_correct(rgb.b);

    let x = r * 0.664511 + g * 0.154324 + b * 0.162028;
    let y = r * 0.283881 + g * 0.668433 + b * 0.047685;
    let z = r * 0.000088 + g * 0.072310 + b * 0.986039;

    let sum = x + y + z;
    if sum <= f64::EPSILON {
        return [0.0, 0.0];
    }
    [x / sum, y / sum]
}

pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let r = rgb.r / 255.0;
    let g = rgb.g / 255.0;
    let b = rgb.b / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta <= f64::EPSILON {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    let s = if max <= f64::EPSILON { 0.0 } else { delta / max };

    Hsv { h, s, v: max }
}

/// Manhattan distance between two XY points, the metric used for near-match checks.
pub fn xy_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).abs() + (a[1] - b[1]).abs()
}
