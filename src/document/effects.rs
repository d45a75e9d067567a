/// Text effect attached to a text element, discriminated by its `type` field.
///
/// Unknown extra fields on an effect are ignored.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TextEffect {
    /// Filled box behind the text.
    TextBox {
        /// Whether the effect is drawn.
        enabled: bool,
        /// CSS color of the box.
        color: String,
        /// Box opacity in `[0, 1]`.
        blend_opacity: f64,
        /// Padding around the text in pixels.
        #[serde(default)]
        spread: f64,
        /// Corner radius in pixels.
        #[serde(default)]
        radius: f64,
    },
    /// Text set along an arc.
    Curved {
        /// Whether the effect is drawn.
        enabled: bool,
        /// Arc angle in degrees.
        angle: f64,
        /// Reference width of the uncurved text.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base_width: Option<f64>,
    },
    /// Stroked glyph outlines.
    Outline {
        /// Whether the effect is drawn.
        enabled: bool,
        /// CSS stroke color.
        color: String,
        /// Stroke opacity.
        opacity: f64,
        /// Stroke width.
        thickness: f64,
        /// Whether the glyph fill is kept.
        has_inner_text: bool,
    },
    /// Offset shadow copy of the text.
    DropShadow {
        /// Whether the effect is drawn.
        enabled: bool,
        /// CSS shadow color.
        color: String,
        /// Shadow color opacity.
        opacity: f64,
        /// Shadow layer opacity.
        blend_opacity: f64,
        /// Shadow spread.
        size: f64,
        /// Blur radius.
        blur: f64,
        /// Offset distance in pixels.
        distance: f64,
        /// Offset direction in degrees.
        angle: f64,
    },
    /// Repeated translucent copies of the text.
    Echo {
        /// Whether the effect is drawn.
        enabled: bool,
        /// Offset distance in pixels.
        distance: f64,
        /// Offset direction in degrees.
        angle: f64,
    },
    /// Channel-split glitch.
    Glitch {
        /// Whether the effect is drawn.
        enabled: bool,
        /// Split size.
        size: f64,
        /// Split direction in degrees.
        angle: f64,
    },
    /// Mirrored copy below the text.
    Reflection {
        /// Whether the effect is drawn.
        enabled: bool,
        /// Reflection size.
        size: f64,
        /// Gap between text and reflection.
        distance: f64,
        /// Reflection transparency.
        transparency: f64,
    },
}

impl TextEffect {
    /// Whether the effect is switched on.
    pub fn enabled(&self) -> bool {
        match self {
            Self::TextBox { enabled, .. }
            | Self::Curved { enabled, .. }
            | Self::Outline { enabled, .. }
            | Self::DropShadow { enabled, .. }
            | Self::Echo { enabled, .. }
            | Self::Glitch { enabled, .. }
            | Self::Reflection { enabled, .. } => *enabled,
        }
    }

    /// The `type` discriminant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TextBox { .. } => "textBox",
            Self::Curved { .. } => "curved",
            Self::Outline { .. } => "outline",
            Self::DropShadow { .. } => "dropShadow",
            Self::Echo { .. } => "echo",
            Self::Glitch { .. } => "glitch",
            Self::Reflection { .. } => "reflection",
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/effects.rs"]
mod tests;
