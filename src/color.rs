//! Colors, the class palette, and value → color mapping.

use crate::classify::{Breakpoints, ClassifyError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color `{0}`, expected #rrggbb")]
pub struct ColorParseError(pub String);

/// Opaque 8-bit RGB color. Serialized as `"#rrggbb"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(ColorParseError(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorParseError(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_hex()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Neutral gray for regions without a usable value.
pub const FALLBACK_COLOR: Rgb = Rgb::new(0x9e, 0x9e, 0x9e);

/// Blue → red ramp, one color per class.
pub const DEFAULT_COLORS: [Rgb; 10] = [
    Rgb::new(0x00, 0x00, 0xff), // blue
    Rgb::new(0x00, 0x33, 0xff),
    Rgb::new(0x00, 0x66, 0xff),
    Rgb::new(0x00, 0x99, 0xff),
    Rgb::new(0x00, 0xcc, 0xff),
    Rgb::new(0x00, 0xff, 0xcc),
    Rgb::new(0x00, 0xff, 0x66),
    Rgb::new(0xff, 0xff, 0x00),
    Rgb::new(0xff, 0x99, 0x00),
    Rgb::new(0xff, 0x00, 0x00), // red
];

/// Ordered class colors; index `i` colors class `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorPalette(Vec<Rgb>);

impl ColorPalette {
    pub fn new(colors: Vec<Rgb>) -> Self {
        Self(colors)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<Rgb> {
        self.0.get(idx).copied()
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.0
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self(DEFAULT_COLORS.to_vec())
    }
}

/// Maps values to palette classes using a set of breakpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMapper {
    thresholds: Vec<f64>,
    palette: ColorPalette,
    fallback: Rgb,
}

impl ColorMapper {
    /// The palette must hold exactly one more color than there are thresholds.
    pub fn new(
        breakpoints: &Breakpoints,
        palette: &ColorPalette,
        fallback: Rgb,
    ) -> Result<Self, ClassifyError> {
        let thresholds = breakpoints.thresholds().to_vec();
        if palette.len() != thresholds.len() + 1 {
            return Err(ClassifyError::PaletteMismatch {
                colors: palette.len(),
                thresholds: thresholds.len(),
            });
        }
        Ok(Self {
            thresholds,
            palette: palette.clone(),
            fallback,
        })
    }

    /// Class of `value`: `i + 1` for the highest threshold `i` the value strictly exceeds,
    /// `0` if it exceeds none. A value equal to a threshold stays in the lower class.
    /// `None` for missing or NaN values.
    pub fn class_index(&self, value: Option<f64>) -> Option<usize> {
        let v = value.filter(|v| !v.is_nan())?;
        let class = self
            .thresholds
            .iter()
            .rposition(|t| v > *t)
            .map_or(0, |i| i + 1);
        Some(class)
    }

    pub fn color_for(&self, value: Option<f64>) -> Rgb {
        self.class_index(value)
            .and_then(|i| self.palette.get(i))
            .unwrap_or(self.fallback)
    }

    pub fn fallback(&self) -> Rgb {
        self.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_parsing() {
        assert_eq!("#059669".parse::<Rgb>().unwrap(), Rgb::new(5, 150, 105));
        assert_eq!("ff0000".parse::<Rgb>().unwrap(), Rgb::new(255, 0, 0));
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
        assert_eq!(Rgb::new(0, 0x33, 0xff).to_hex(), "#0033ff");
    }

    #[test]
    fn palette_serializes_as_hex_strings() {
        let p = ColorPalette::new(vec![Rgb::new(0, 0, 255), Rgb::new(255, 0, 0)]);
        let s = serde_json::to_string(&p).unwrap();
        assert_eq!(s, r##"["#0000ff","#ff0000"]"##);
        let back: ColorPalette = serde_json::from_str(&s).unwrap();
        assert_eq!(back, p);
    }
}
