//! Older flat-array document format and its conversion to [`DocumentRecord`].
//!
//! Legacy records store geometry as fractions of the canvas, angles in radians, `capitalize`
//! as strings, and a single color per element instead of per-character maps.

use std::collections::BTreeMap;

use crate::{
    document::record::{DocumentRecord, ImagePayload},
    foundation::error::{RenderError, RenderResult},
};

/// A design document in the legacy flat-array format.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LegacyDocumentRecord {
    /// Canvas width in canvas units.
    pub canvas_width: f64,
    /// Canvas height in canvas units.
    pub canvas_height: f64,
    /// Number of elements.
    pub length: usize,
    /// Element x offsets as fractions of the canvas width.
    #[serde(default)]
    pub left: Vec<f64>,
    /// Element y offsets as fractions of the canvas height.
    #[serde(default)]
    pub top: Vec<f64>,
    /// Element widths as fractions of the canvas width.
    #[serde(default)]
    pub width: Vec<f64>,
    /// Element heights as fractions of the canvas height.
    #[serde(default)]
    pub height: Vec<f64>,
    /// Element rotations in radians.
    #[serde(default)]
    pub angle: Vec<f64>,
    /// Element opacities.
    #[serde(default)]
    pub opacity: Vec<f64>,
    /// Element type discriminants, lowercase-initial.
    #[serde(rename = "type", default)]
    pub kind: Vec<String>,
    /// Element RGB colors.
    #[serde(default)]
    pub color: Vec<[u8; 3]>,
    /// Embedded image payloads.
    #[serde(default)]
    pub image: Vec<Option<ImagePayload>>,
    /// Text content, possibly with runs of newlines.
    #[serde(default)]
    pub text: Vec<String>,
    /// Font family names.
    #[serde(default)]
    pub font: Vec<String>,
    /// Font sizes.
    #[serde(default)]
    pub font_size: Vec<f64>,
    /// Line heights.
    #[serde(default)]
    pub line_height: Vec<f64>,
    /// Alignment keywords.
    #[serde(default)]
    pub text_align: Vec<String>,
    /// `"true"` or anything else.
    #[serde(default)]
    pub capitalize: Vec<String>,
    /// Letter spacing values.
    #[serde(default)]
    pub letter_spacing: Vec<f64>,
    /// Top-level fields not declared above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl LegacyDocumentRecord {
    /// Parse a legacy document from JSON text.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| RenderError::validation(format!("invalid legacy document record: {e}")))
    }

    /// Guess whether a JSON document uses the legacy format.
    ///
    /// Legacy records carry string `capitalize` flags or an element `color` array, and never
    /// per-character `text_color` arrays.
    pub fn detect(value: &serde_json::Value) -> bool {
        if value.get("text_color").is_some() {
            return false;
        }
        let string_caps = value
            .get("capitalize")
            .and_then(serde_json::Value::as_array)
            .and_then(|a| a.first())
            .is_some_and(serde_json::Value::is_string);
        string_caps || value.get("color").is_some()
    }

    /// Reshape into the current per-element format.
    ///
    /// Never fails: missing per-element entries fall back to empty text and black color.
    pub fn convert_to_current(&self) -> DocumentRecord {
        let n = self.length;
        let canvas_width = self.canvas_width.trunc();
        let canvas_height = self.canvas_height.trunc();

        let text: Vec<String> = self.text.iter().map(|t| collapse_newlines(t)).collect();
        let text_at = |i: usize| text.get(i).map(String::as_str).unwrap_or("");

        let text_color = (0..n)
            .map(|i| {
                let [r, g, b] = self.color.get(i).copied().unwrap_or([0, 0, 0]);
                let a = self.opacity.get(i).copied().unwrap_or(1.0);
                let rgba = format!("rgba({r},{g},{b},{a})");
                vec![rgba; text_at(i).chars().count()]
            })
            .collect();
        let text_line = (0..n).map(|i| line_indices(text_at(i))).collect();
        let no_markup = |i: usize| vec![false; text_at(i).chars().count()];

        DocumentRecord {
            canvas_width,
            canvas_height,
            length: n,
            left: self.left.iter().map(|x| x * canvas_width).collect(),
            top: self.top.iter().map(|y| y * canvas_height).collect(),
            width: self.width.iter().map(|w| w * canvas_width).collect(),
            height: self.height.iter().map(|h| h * canvas_height).collect(),
            angle: self.angle.iter().map(|rad| rad.to_degrees()).collect(),
            opacity: self.opacity.clone(),
            kind: (0..n)
                .map(|i| capitalize_first(self.kind.get(i).map(String::as_str).unwrap_or("")))
                .collect(),
            image: self.image.clone(),
            font: self.font.clone(),
            font_size: self.font_size.clone(),
            line_height: self.line_height.clone(),
            text_align: self.text_align.clone(),
            capitalize: self.capitalize.iter().map(|c| c == "true").collect(),
            letter_spacing: self.letter_spacing.clone(),
            font_bold: (0..n).map(no_markup).collect(),
            font_italic: (0..n).map(no_markup).collect(),
            text_color,
            text_line,
            text,
            extra: self.extra.clone(),
        }
    }
}

/// Collapse every run of consecutive `\n` into one.
pub(crate) fn collapse_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_newline = false;
    for c in text.chars() {
        if c == '\n' && prev_newline {
            continue;
        }
        prev_newline = c == '\n';
        out.push(c);
    }
    out
}

/// Running count of newlines up to and including each character.
pub(crate) fn line_indices(text: &str) -> Vec<i64> {
    text.chars()
        .scan(0i64, |count, c| {
            if c == '\n' {
                *count += 1;
            }
            Some(*count)
        })
        .collect()
}

/// Uppercase the first character; the rest passes through untouched.
pub(crate) fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/legacy/record.rs"]
mod tests;
