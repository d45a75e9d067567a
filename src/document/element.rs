use std::{collections::BTreeMap, fmt, str::FromStr};

use crate::foundation::error::{RenderError, RenderResult};

/// Element type discriminant.
///
/// Dataset versions differ in the casing of the first letter (`textElement` vs `TextElement`);
/// parsing accepts either, and the canonical form is the capitalized one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ElementKind {
    /// Solid or gradient page background.
    ColoredBackground,
    /// Raster image.
    Image,
    /// Masked image.
    Mask,
    /// Vector graphic; SVG payloads are rasterized at element size.
    Svg,
    /// Styled text.
    Text,
}

impl ElementKind {
    /// Every element kind.
    pub const ALL: [Self; 5] = [
        Self::ColoredBackground,
        Self::Image,
        Self::Mask,
        Self::Svg,
        Self::Text,
    ];

    /// Canonical discriminant string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ColoredBackground => "ColoredBackground",
            Self::Image => "ImageElement",
            Self::Mask => "MaskElement",
            Self::Svg => "SvgElement",
            Self::Text => "TextElement",
        }
    }

    /// Return `true` for text elements.
    pub fn is_text(self) -> bool {
        self == Self::Text
    }
}

impl FromStr for ElementKind {
    type Err = RenderError;

    fn from_str(s: &str) -> RenderResult<Self> {
        let mut chars = s.chars();
        let first = chars.next();
        let rest = chars.as_str();
        Self::ALL
            .into_iter()
            .find(|kind| {
                let mut canon = kind.as_str().chars();
                let canon_first = canon.next();
                matches!((first, canon_first), (Some(a), Some(b)) if a.eq_ignore_ascii_case(&b))
                    && canon.as_str() == rest
            })
            .ok_or_else(|| RenderError::validation(format!("unknown element type '{s}'")))
    }
}

impl TryFrom<String> for ElementKind {
    type Error = RenderError;

    fn try_from(s: String) -> RenderResult<Self> {
        s.parse()
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_opacity() -> f64 {
    1.0
}

/// Geometry and identity shared by every design element.
///
/// Undeclared fields are kept in [`DesignElement::extra`] and written back on serialization.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DesignElement {
    /// Opaque element id.
    pub uuid: String,
    /// Type discriminant.
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Width in canvas units, > 0.
    pub width: f64,
    /// Height in canvas units, > 0.
    pub height: f64,
    /// Clockwise rotation in degrees about the element center.
    #[serde(default)]
    pub angle: f64,
    /// Canvas-space x offset.
    #[serde(default)]
    pub left: f64,
    /// Canvas-space y offset.
    #[serde(default)]
    pub top: f64,
    /// Opacity in `[0, 1]`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Fields not declared above.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl DesignElement {
    /// Build a validated element at the origin with no rotation and full opacity.
    pub fn new(uuid: impl Into<String>, kind: ElementKind, width: f64, height: f64) -> RenderResult<Self> {
        let out = Self {
            uuid: uuid.into(),
            kind,
            width,
            height,
            angle: 0.0,
            left: 0.0,
            top: 0.0,
            opacity: 1.0,
            extra: BTreeMap::new(),
        };
        out.validate()?;
        Ok(out)
    }

    /// Deserialize and validate an element from JSON.
    pub fn from_value(value: serde_json::Value) -> RenderResult<Self> {
        let out: Self = serde_json::from_value(value)
            .map_err(|e| RenderError::validation(format!("invalid design element: {e}")))?;
        out.validate()?;
        Ok(out)
    }

    /// Move the element to `(left, top)`.
    pub fn at(mut self, left: f64, top: f64) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    /// Rotate the element by `angle` degrees.
    pub fn rotated(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    /// Set opacity, rejecting values outside `[0, 1]`.
    pub fn with_opacity(mut self, opacity: f64) -> RenderResult<Self> {
        self.opacity = opacity;
        self.validate()?;
        Ok(self)
    }

    /// Check element invariants.
    pub fn validate(&self) -> RenderResult<()> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(RenderError::validation(format!(
                "element '{}' width must be finite and > 0",
                self.uuid
            )));
        }
        if !self.height.is_finite() || self.height <= 0.0 {
            return Err(RenderError::validation(format!(
                "element '{}' height must be finite and > 0",
                self.uuid
            )));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(RenderError::validation(format!(
                "element '{}' opacity must be in [0, 1]",
                self.uuid
            )));
        }
        if !self.angle.is_finite() || !self.left.is_finite() || !self.top.is_finite() {
            return Err(RenderError::validation(format!(
                "element '{}' position and angle must be finite",
                self.uuid
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/element.rs"]
mod tests;
