use std::{collections::BTreeMap, path::Path};

use anyhow::Context;
use base64::Engine;

use crate::{
    document::element::{DesignElement, ElementKind},
    document::map::build_interval_map,
    document::text::{TextElement, TextProperty},
    foundation::error::{RenderError, RenderResult},
};

/// Embedded image payload of one element.
///
/// Accepts raw byte arrays, base64 strings (optionally wrapped in a `data:` URL), or the
/// `{ "bytes": ..., "path": ... }` object form used by dataset exports.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ImagePayload {
    /// Encoded image file bytes.
    Bytes(Vec<u8>),
    /// Base64 of the encoded image file, or a `data:` URL.
    Encoded(String),
    /// Object form; `bytes` takes precedence over `path`.
    Object {
        /// Inline payload.
        #[serde(default)]
        bytes: Option<Box<ImagePayload>>,
        /// Filesystem path of the encoded image.
        #[serde(default)]
        path: Option<String>,
    },
}

impl ImagePayload {
    /// Encoded image file bytes carried by this payload.
    pub fn to_bytes(&self) -> RenderResult<Vec<u8>> {
        match self {
            Self::Bytes(b) => Ok(b.clone()),
            Self::Encoded(s) => {
                let body = match s.strip_prefix("data:") {
                    Some(rest) => rest.split_once(',').map(|(_, b)| b).ok_or_else(|| {
                        RenderError::validation("data URL image payload has no ',' separator")
                    })?,
                    None => s.as_str(),
                };
                base64::engine::general_purpose::STANDARD
                    .decode(body.trim())
                    .map_err(|e| RenderError::validation(format!("invalid base64 image payload: {e}")))
            }
            Self::Object {
                bytes: Some(inner), ..
            } => inner.to_bytes(),
            Self::Object {
                bytes: None,
                path: Some(path),
            } => Ok(std::fs::read(Path::new(path))
                .with_context(|| format!("read image payload '{path}'"))?),
            Self::Object {
                bytes: None,
                path: None,
            } => Err(RenderError::validation(
                "image payload object carries neither bytes nor path",
            )),
        }
    }
}

/// A design document in the current per-element array format.
///
/// Every per-element array is index-aligned by element position `0..length`. Text arrays may be
/// omitted entirely (empty) when the document has no text to render.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DocumentRecord {
    /// Canvas width in canvas units.
    pub canvas_width: f64,
    /// Canvas height in canvas units.
    pub canvas_height: f64,
    /// Number of elements.
    pub length: usize,
    /// Element x offsets.
    pub left: Vec<f64>,
    /// Element y offsets.
    pub top: Vec<f64>,
    /// Element widths.
    pub width: Vec<f64>,
    /// Element heights.
    pub height: Vec<f64>,
    /// Element rotations in degrees.
    #[serde(default)]
    pub angle: Vec<f64>,
    /// Element opacities.
    #[serde(default)]
    pub opacity: Vec<f64>,
    /// Element type discriminants.
    #[serde(rename = "type")]
    pub kind: Vec<String>,
    /// Embedded image payloads.
    #[serde(default)]
    pub image: Vec<Option<ImagePayload>>,
    /// Text content.
    #[serde(default)]
    pub text: Vec<String>,
    /// Font family names.
    #[serde(default)]
    pub font: Vec<String>,
    /// Font sizes.
    #[serde(default)]
    pub font_size: Vec<f64>,
    /// Line heights relative to the font size.
    #[serde(default)]
    pub line_height: Vec<f64>,
    /// Alignment keywords.
    #[serde(default)]
    pub text_align: Vec<String>,
    /// Uppercase flags.
    #[serde(default)]
    pub capitalize: Vec<bool>,
    /// Letter spacing values.
    #[serde(default)]
    pub letter_spacing: Vec<f64>,
    /// Per-character bold flags.
    #[serde(default)]
    pub font_bold: Vec<Vec<bool>>,
    /// Per-character italic flags.
    #[serde(default)]
    pub font_italic: Vec<Vec<bool>>,
    /// Per-character CSS colors.
    #[serde(default)]
    pub text_color: Vec<Vec<String>>,
    /// Per-character line indices.
    #[serde(default)]
    pub text_line: Vec<Vec<i64>>,
    /// Top-level fields not declared above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DocumentRecord {
    /// Parse a document from JSON text and validate it.
    pub fn from_json(json: &str) -> RenderResult<Self> {
        let out: Self = serde_json::from_str(json)
            .map_err(|e| RenderError::validation(format!("invalid document record: {e}")))?;
        out.validate()?;
        Ok(out)
    }

    /// Check canvas dimensions and array alignment.
    ///
    /// Geometry and type arrays must hold exactly `length` entries. `angle`, `opacity` and the
    /// text arrays may be empty (defaults apply) or must hold `length` entries.
    pub fn validate(&self) -> RenderResult<()> {
        if !self.canvas_width.is_finite() || self.canvas_width <= 0.0 {
            return Err(RenderError::validation("canvas_width must be finite and > 0"));
        }
        if !self.canvas_height.is_finite() || self.canvas_height <= 0.0 {
            return Err(RenderError::validation("canvas_height must be finite and > 0"));
        }

        let n = self.length;
        let required = [
            ("left", self.left.len()),
            ("top", self.top.len()),
            ("width", self.width.len()),
            ("height", self.height.len()),
            ("type", self.kind.len()),
        ];
        for (name, len) in required {
            if len != n {
                return Err(RenderError::validation(format!(
                    "array '{name}' has {len} entries, expected {n}"
                )));
            }
        }

        let optional = [
            ("angle", self.angle.len()),
            ("opacity", self.opacity.len()),
            ("image", self.image.len()),
            ("text", self.text.len()),
            ("font", self.font.len()),
            ("font_size", self.font_size.len()),
            ("line_height", self.line_height.len()),
            ("text_align", self.text_align.len()),
            ("capitalize", self.capitalize.len()),
            ("letter_spacing", self.letter_spacing.len()),
            ("font_bold", self.font_bold.len()),
            ("font_italic", self.font_italic.len()),
            ("text_color", self.text_color.len()),
            ("text_line", self.text_line.len()),
        ];
        for (name, len) in optional {
            if len != 0 && len != n {
                return Err(RenderError::validation(format!(
                    "array '{name}' has {len} entries, expected 0 or {n}"
                )));
            }
        }
        Ok(())
    }

    /// Parsed type discriminant of element `i`.
    pub fn element_kind(&self, i: usize) -> RenderResult<ElementKind> {
        self.kind
            .get(i)
            .ok_or_else(|| RenderError::validation(format!("element {i} out of range")))?
            .parse()
    }

    /// Geometry of element `i`; its uuid is the element index.
    pub fn design_element(&self, i: usize) -> RenderResult<DesignElement> {
        if i >= self.length {
            return Err(RenderError::validation(format!(
                "element {i} out of range (length {})",
                self.length
            )));
        }
        let kind = self.element_kind(i)?;
        DesignElement::new(i.to_string(), kind, self.width[i], self.height[i])?
            .at(self.left[i], self.top[i])
            .rotated(self.angle.get(i).copied().unwrap_or(0.0))
            .with_opacity(self.opacity.get(i).copied().unwrap_or(1.0))
    }

    /// Image payload of element `i`.
    pub fn image_payload(&self, i: usize) -> RenderResult<&ImagePayload> {
        self.image
            .get(i)
            .and_then(Option::as_ref)
            .ok_or_else(|| RenderError::validation(format!("element {i} has no image payload")))
    }

    /// Assemble element `i` as a text element, converting per-character arrays to interval maps.
    ///
    /// The element is assembled at full opacity: text transparency comes only from the alpha of
    /// its `text_color` entries, which legacy conversion derives from the element opacity.
    pub fn text_element(&self, i: usize) -> RenderResult<TextElement> {
        let element = self.design_element(i)?.with_opacity(1.0)?;
        let text = field(&self.text, i, "text")?.clone();
        let font = field(&self.font, i, "font")?.clone();
        let font_size = *field(&self.font_size, i, "font_size")?;
        let line_height = *field(&self.line_height, i, "line_height")?;
        let text_align = field(&self.text_align, i, "text_align")?.parse()?;
        let color_map = self
            .text_color
            .get(i)
            .map(|c| build_interval_map(c))
            .unwrap_or_default();

        let mut props =
            TextProperty::new(text, font, font_size, line_height, text_align, color_map)?
                .with_casing(
                    self.capitalize.get(i).copied().unwrap_or(false),
                    self.letter_spacing.get(i).copied().unwrap_or(0.0),
                )?;
        if let Some(bold) = self.font_bold.get(i) {
            props = props.with_bold_map(build_interval_map(bold));
        }
        if let Some(italic) = self.font_italic.get(i) {
            props = props.with_italic_map(build_interval_map(italic));
        }
        if let Some(line) = self.text_line.get(i) {
            props = props.with_line_map(build_interval_map(line));
        }
        TextElement::new(element, props)
    }
}

fn field<'a, T>(values: &'a [T], i: usize, name: &str) -> RenderResult<&'a T> {
    values
        .get(i)
        .ok_or_else(|| RenderError::validation(format!("text element {i} is missing '{name}'")))
}

#[cfg(test)]
#[path = "../../tests/unit/document/record.rs"]
mod tests;
