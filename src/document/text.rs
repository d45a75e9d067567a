use std::{fmt, str::FromStr};

use crate::{
    document::effects::TextEffect,
    document::element::{DesignElement, ElementKind},
    document::map::{MapValue, TextMapItem},
    foundation::error::{RenderError, RenderResult},
};

/// Horizontal text alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Flush right.
    Right,
    /// Centered.
    Center,
    /// Justified.
    Justify,
}

impl FromStr for TextAlign {
    type Err = RenderError;

    fn from_str(s: &str) -> RenderResult<Self> {
        match s {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "center" => Ok(Self::Center),
            "justify" => Ok(Self::Justify),
            other => Err(RenderError::validation(format!(
                "invalid textAlign '{other}'"
            ))),
        }
    }
}

impl fmt::Display for TextAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
            Self::Justify => "justify",
        })
    }
}

/// Line breaking mode inside words.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WordBreak {
    /// Break inside words only when a word does not fit.
    BreakWord,
    /// Break between any two characters.
    BreakAll,
}

/// Keys of [`TextProperty`] as they appear in element JSON.
pub(crate) const TEXT_PROPERTY_KEYS: [&str; 19] = [
    "text",
    "fontSize",
    "font",
    "lineHeight",
    "textAlign",
    "capitalize",
    "letterSpacing",
    "colorMap",
    "wordBreak",
    "underline",
    "boldMap",
    "italicMap",
    "underlineMap",
    "linkMap",
    "lineMap",
    "opacityMap",
    "weightMap",
    "styleMap",
    "effects",
];

/// Text content plus its per-character style maps.
///
/// Build through [`TextProperty::new`] or [`TextProperty::from_value`]; both decode HTML entities
/// in `text` and synthesize a line map when none is given.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextProperty {
    /// Text content with HTML entities decoded.
    pub text: String,
    /// Font size in canvas units, > 0.
    pub font_size: f64,
    /// Requested font family name.
    pub font: String,
    /// Line height relative to the font size, > 0.
    pub line_height: f64,
    /// Horizontal alignment.
    pub text_align: TextAlign,
    /// Render the text uppercased.
    pub capitalize: bool,
    /// Extra spacing between characters in canvas units.
    pub letter_spacing: f64,
    /// Text color per character range (CSS color strings).
    pub color_map: Vec<TextMapItem>,
    /// Word breaking mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_break: Option<WordBreak>,
    /// Underline the whole text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    /// Bold flag per range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold_map: Option<Vec<TextMapItem>>,
    /// Italic flag per range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic_map: Option<Vec<TextMapItem>>,
    /// Underline flag per range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub underline_map: Option<Vec<TextMapItem>>,
    /// Link targets per range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_map: Option<Vec<TextMapItem>>,
    /// Line index per range; synthesized as a single line when absent. An explicit empty map is
    /// kept as given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_map: Option<Vec<TextMapItem>>,
    /// Opacity multiplier per range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity_map: Option<Vec<TextMapItem>>,
    /// Font weight keyword or number per range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_map: Option<Vec<TextMapItem>>,
    /// Font style keyword per range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_map: Option<Vec<TextMapItem>>,
    /// Text effects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effects: Option<Vec<TextEffect>>,
}

impl TextProperty {
    /// Build a text property with no optional maps, then normalize it.
    pub fn new(
        text: impl Into<String>,
        font: impl Into<String>,
        font_size: f64,
        line_height: f64,
        text_align: TextAlign,
        color_map: Vec<TextMapItem>,
    ) -> RenderResult<Self> {
        Self {
            text: text.into(),
            font_size,
            font: font.into(),
            line_height,
            text_align,
            capitalize: false,
            letter_spacing: 0.0,
            color_map,
            word_break: None,
            underline: None,
            bold_map: None,
            italic_map: None,
            underline_map: None,
            link_map: None,
            line_map: None,
            opacity_map: None,
            weight_map: None,
            style_map: None,
            effects: None,
        }
        .normalized()
    }

    /// Deserialize from element JSON and normalize. Unknown fields are ignored.
    pub fn from_value(value: serde_json::Value) -> RenderResult<Self> {
        let raw: Self = serde_json::from_value(value)
            .map_err(|e| RenderError::validation(format!("invalid text property: {e}")))?;
        raw.normalized()
    }

    /// Validate, decode HTML entities in `text`, and fill in a missing line map.
    ///
    /// Call once per construction: decoding is not idempotent for doubly-escaped input.
    pub fn normalized(mut self) -> RenderResult<Self> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(RenderError::validation("fontSize must be finite and > 0"));
        }
        if !self.line_height.is_finite() || self.line_height <= 0.0 {
            return Err(RenderError::validation("lineHeight must be finite and > 0"));
        }
        if !self.letter_spacing.is_finite() {
            return Err(RenderError::validation("letterSpacing must be finite"));
        }

        self.text = html_escape::decode_html_entities(&self.text).into_owned();
        if self.line_map.is_none() {
            let last = self.char_count() as i64 - 1;
            self.line_map = Some(vec![TextMapItem::new(0, last, "line").with_kind("line")]);
        }
        Ok(self)
    }

    /// Line map items; empty only when an empty map was supplied.
    pub fn line_map(&self) -> &[TextMapItem] {
        self.line_map.as_deref().unwrap_or_default()
    }

    /// Number of characters in `text`.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Replace the bold map.
    pub fn with_bold_map(mut self, map: Vec<TextMapItem>) -> Self {
        self.bold_map = Some(map);
        self
    }

    /// Replace the italic map.
    pub fn with_italic_map(mut self, map: Vec<TextMapItem>) -> Self {
        self.italic_map = Some(map);
        self
    }

    /// Replace the line map.
    pub fn with_line_map(mut self, map: Vec<TextMapItem>) -> Self {
        self.line_map = Some(map);
        self
    }

    /// Set uppercase rendering and letter spacing.
    pub fn with_casing(mut self, capitalize: bool, letter_spacing: f64) -> RenderResult<Self> {
        if !letter_spacing.is_finite() {
            return Err(RenderError::validation("letterSpacing must be finite"));
        }
        self.capitalize = capitalize;
        self.letter_spacing = letter_spacing;
        Ok(self)
    }

    /// Attach text effects.
    pub fn with_effects(mut self, effects: Vec<TextEffect>) -> Self {
        self.effects = Some(effects);
        self
    }
}

/// A design element of kind [`ElementKind::Text`] together with its text properties.
#[derive(Clone, Debug, PartialEq)]
pub struct TextElement {
    /// Geometry and identity.
    pub element: DesignElement,
    /// Text content and style maps.
    pub props: TextProperty,
}

impl TextElement {
    /// Combine geometry and properties; the element must be a text element.
    pub fn new(element: DesignElement, props: TextProperty) -> RenderResult<Self> {
        if !element.kind.is_text() {
            return Err(RenderError::validation(format!(
                "element '{}' has type {}, expected {}",
                element.uuid,
                element.kind,
                ElementKind::Text
            )));
        }
        element.validate()?;
        Ok(Self { element, props })
    }

    /// Parse a text element from one flat JSON object.
    pub fn from_value(value: serde_json::Value) -> RenderResult<Self> {
        let props = TextProperty::from_value(value.clone())?;
        let mut element = DesignElement::from_value(value)?;
        for key in TEXT_PROPERTY_KEYS {
            element.extra.remove(key);
        }
        Self::new(element, props)
    }

    /// Serialize back into one flat JSON object.
    pub fn to_value(&self) -> RenderResult<serde_json::Value> {
        let mut out = serde_json::to_value(&self.element)
            .map_err(|e| RenderError::serde(e.to_string()))?;
        let props =
            serde_json::to_value(&self.props).map_err(|e| RenderError::serde(e.to_string()))?;
        if let (Some(out_obj), serde_json::Value::Object(props_obj)) = (out.as_object_mut(), props)
        {
            out_obj.extend(props_obj);
        }
        Ok(out)
    }

    /// Line index of character `index`, from the line map.
    pub fn line_at(&self, index: usize) -> Option<&MapValue> {
        crate::document::map::value_at(self.props.line_map(), index)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/text.rs"]
mod tests;
