//! RGB colors, HSV conversion and the polar mapping used by the wheel.

use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn as_tuple(self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Builds a color from HSV components in `[0, 1]`.
    ///
    /// Channels are truncated, so a value of `1.0` maps to `255` and
    /// anything below `1/255` maps to `0`.
    pub fn from_hsv(hue: f64, saturation: f64, value: f64) -> Self {
        let (r, g, b) = hsv_to_rgb(hue, saturation, value);
        Self::new(quantize(r), quantize(g), quantize(b))
    }

    /// Returns `(hue, saturation, value)`, each in `[0, 1]`.
    pub fn to_hsv(self) -> (f64, f64, f64) {
        rgb_to_hsv(
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }
}

fn quantize(channel: f64) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0) as u8
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseColorError {
    #[error("expected 6 hex digits, got {0}")]
    BadLength(usize),
    #[error("invalid hex digits in {0:?}")]
    BadDigit(String),
}

impl FromStr for Color {
    type Err = ParseColorError;

    /// Parses `#rrggbb` or `rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(ParseColorError::BadLength(digits.len()));
        }
        if !digits.is_ascii() {
            return Err(ParseColorError::BadDigit(digits.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ParseColorError::BadDigit(digits.to_string()))
        };
        Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

// ============================================================================
// HSV CONVERSION
// ============================================================================

/// Converts HSV to RGB, all components in `[0, 1]`.
pub fn hsv_to_rgb(hue: f64, saturation: f64, value: f64) -> (f64, f64, f64) {
    if saturation == 0.0 {
        return (value, value, value);
    }
    let scaled = hue * 6.0;
    let sextant = scaled.floor();
    let f = scaled - sextant;
    let p = value * (1.0 - saturation);
    let q = value * (1.0 - saturation * f);
    let t = value * (1.0 - saturation * (1.0 - f));
    match (sextant as i64).rem_euclid(6) {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    }
}

/// Converts RGB to HSV, all components in `[0, 1]`. Greys report hue 0.
pub fn rgb_to_hsv(r: f64, g: f64, b: f64) -> (f64, f64, f64) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let value = max;
    if max == min {
        return (0.0, 0.0, value);
    }
    let range = max - min;
    let saturation = range / max;
    let rc = (max - r) / range;
    let gc = (max - g) / range;
    let bc = (max - b) / range;
    let hue = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    ((hue / 6.0).rem_euclid(1.0), saturation, value)
}

// ============================================================================
// POLAR MAPPING
// ============================================================================

/// A point on the wheel expressed as an angle and a normalized distance.
///
/// `angle` runs counter-clockwise from the positive x-axis in `[0, 2π)`.
/// Screen y grows downward, so the vertical offset is negated before the
/// angle is taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarSample {
    pub angle: f64,
    pub radial_fraction: f64,
}

impl PolarSample {
    /// Builds a sample from a screen-space offset relative to the wheel center.
    ///
    /// The radial fraction is clamped to 1.0, so offsets that land a hair
    /// past the rim still map to a fully saturated color.
    pub fn from_offset(dx: f64, dy: f64, radius: f64) -> Self {
        let angle = (-dy).atan2(dx).rem_euclid(TAU);
        let radial_fraction = (dx.hypot(dy) / radius).min(1.0);
        Self {
            angle,
            radial_fraction,
        }
    }

    /// Recovers the sample a color would have been picked from.
    ///
    /// Only hue and saturation matter: the wheel is drawn at full value.
    pub fn from_color(color: Color) -> Self {
        let (hue, saturation, _) = color.to_hsv();
        Self {
            angle: hue * TAU,
            radial_fraction: saturation,
        }
    }

    /// Screen-space offset from the wheel center for the given radius.
    pub fn to_offset(self, radius: f64) -> (f64, f64) {
        let distance = self.radial_fraction * radius;
        (
            distance * self.angle.cos(),
            -distance * self.angle.sin(),
        )
    }

    pub fn hue(self) -> f64 {
        self.angle / TAU
    }

    pub fn to_color(self) -> Color {
        Color::from_hsv(self.hue(), self.radial_fraction, 1.0)
    }
}
