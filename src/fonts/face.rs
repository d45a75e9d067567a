use std::{fmt, str::FromStr};

use crate::foundation::error::{RenderError, RenderResult};

/// The nine recognized font weights, lightest first.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// `thin` (100).
    Thin,
    /// `extralight` (200).
    ExtraLight,
    /// `light` (300).
    Light,
    /// `regular` (400).
    #[default]
    Regular,
    /// `medium` (500).
    Medium,
    /// `semibold` (600).
    SemiBold,
    /// `bold` (700).
    Bold,
    /// `extrabold` (800).
    ExtraBold,
    /// `black` (900).
    Black,
}

impl FontWeight {
    /// Every recognized weight.
    pub const ALL: [Self; 9] = [
        Self::Thin,
        Self::ExtraLight,
        Self::Light,
        Self::Regular,
        Self::Medium,
        Self::SemiBold,
        Self::Bold,
        Self::ExtraBold,
        Self::Black,
    ];

    /// Keyword used in font records and queries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Thin => "thin",
            Self::ExtraLight => "extralight",
            Self::Light => "light",
            Self::Regular => "regular",
            Self::Medium => "medium",
            Self::SemiBold => "semibold",
            Self::Bold => "bold",
            Self::ExtraBold => "extrabold",
            Self::Black => "black",
        }
    }

    /// Match an exact lowercase keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.as_str() == keyword)
    }

    /// CSS numeric weight.
    pub fn numeric(self) -> u16 {
        match self {
            Self::Thin => 100,
            Self::ExtraLight => 200,
            Self::Light => 300,
            Self::Regular => 400,
            Self::Medium => 500,
            Self::SemiBold => 600,
            Self::Bold => 700,
            Self::ExtraBold => 800,
            Self::Black => 900,
        }
    }

    /// Snap a numeric weight to the nearest recognized level.
    pub fn from_numeric(weight: u16) -> Self {
        let level = ((u32::from(weight) + 50) / 100).clamp(1, 9);
        Self::ALL[(level - 1) as usize]
    }

    /// Return `true` for semibold and heavier.
    pub fn is_bold(self) -> bool {
        self >= Self::SemiBold
    }
}

impl PartialOrd for FontWeight {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FontWeight {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.numeric().cmp(&other.numeric())
    }
}

impl FromStr for FontWeight {
    type Err = RenderError;

    fn from_str(s: &str) -> RenderResult<Self> {
        Self::from_keyword(s)
            .ok_or_else(|| RenderError::validation(format!("invalid font weight: {s}")))
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The four recognized font styles.
///
/// `bold` and `bolditalic` are styles in the dataset's font records, independent of the weight.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// `regular`.
    #[default]
    Regular,
    /// `bold`.
    Bold,
    /// `italic`.
    Italic,
    /// `bolditalic`.
    BoldItalic,
}

impl FontStyle {
    /// Every recognized style.
    pub const ALL: [Self; 4] = [Self::Regular, Self::Bold, Self::Italic, Self::BoldItalic];

    /// Keyword used in font records and queries.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::BoldItalic => "bolditalic",
        }
    }

    /// Match an exact lowercase keyword.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == keyword)
    }

    /// Style for a run of text with the given bold/italic flags.
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => Self::Regular,
            (true, false) => Self::Bold,
            (false, true) => Self::Italic,
            (true, true) => Self::BoldItalic,
        }
    }
}

impl FromStr for FontStyle {
    type Err = RenderError;

    fn from_str(s: &str) -> RenderResult<Self> {
        Self::from_keyword(s)
            .ok_or_else(|| RenderError::validation(format!("invalid font style: {s}")))
    }
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete font face: a (family, weight, style) combination backed by font-file bytes.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FontFace {
    /// Display family name of the face.
    #[serde(rename = "fontFamily")]
    pub font_family: String,
    /// Face weight; records without one are `regular`.
    #[serde(rename = "fontWeight", default)]
    pub font_weight: FontWeight,
    /// Face style; records without one are `regular`.
    #[serde(rename = "fontStyle", default)]
    pub font_style: FontStyle,
    /// Raw font file bytes (TTF/OTF).
    pub bytes: Vec<u8>,
}

impl FontFace {
    /// Build a face record.
    pub fn new(
        font_family: impl Into<String>,
        font_weight: FontWeight,
        font_style: FontStyle,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            font_family: font_family.into(),
            font_weight,
            font_style,
            bytes,
        }
    }

    /// Return `true` when this face is exactly `(weight, style)`.
    pub fn matches(&self, weight: FontWeight, style: FontStyle) -> bool {
        self.font_weight == weight && self.font_style == style
    }
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("font_family", &self.font_family)
            .field("font_weight", &self.font_weight)
            .field("font_style", &self.font_style)
            .field("bytes_len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/fonts/face.rs"]
mod tests;
