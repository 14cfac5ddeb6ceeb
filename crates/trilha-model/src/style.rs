use core::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An ARGB color.
///
/// Serialized as a `#AARRGGBB` hex string for IPC friendliness.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub argb: u32,
}

impl Color {
    pub const fn new_argb(argb: u32) -> Self {
        Self { argb }
    }

    fn to_hex(self) -> String {
        format!("#{:08X}", self.argb)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let s = s.trim();
        let hex = s.strip_prefix('#').ok_or_else(|| {
            D::Error::custom("color must be a #AARRGGBB hex string (missing '#')")
        })?;
        if hex.len() != 8 {
            return Err(D::Error::custom(
                "color must be a #AARRGGBB hex string (8 hex digits)",
            ));
        }
        let argb = u32::from_str_radix(hex, 16).map_err(|_| D::Error::custom("invalid hex"))?;
        Ok(Color { argb })
    }
}

/// Minimum font size, in points, for a cell to read as a section title.
pub(crate) const TITLE_FONT_MIN_POINTS: u16 = 14;

/// The style attributes the extraction heuristics look at.
///
/// This is an explicit value type rather than a loose attribute map so the
/// classification functions stay pure and testable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct CellStyle {
    /// Font size in 1/100 points (e.g. 1100 = 11pt).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size_100pt: Option<u16>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    /// Fill (background) color, when the cell has a non-default fill.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
}

impl CellStyle {
    /// Font size in whole points, rounded down.
    pub fn font_points(&self) -> Option<u16> {
        self.font_size_100pt.map(|s| s / 100)
    }

    /// Whether the cell has a non-default fill color.
    pub fn has_fill(&self) -> bool {
        self.fill.is_some()
    }

    /// Whether the style reads as a section title: large bold font with a
    /// non-default fill.
    pub fn is_title_like(&self) -> bool {
        self.bold
            && self.has_fill()
            && self
                .font_points()
                .is_some_and(|pts| pts >= TITLE_FONT_MIN_POINTS)
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}
