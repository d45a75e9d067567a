use crate::foundation::error::{RenderError, RenderResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Straight-alpha RGBA8 color as written in design documents.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black, the fallback text color.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white, the default canvas background.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);

    /// Build a color from straight-alpha channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from a `[r, g, b, a]` array.
    pub const fn from_array(rgba: [u8; 4]) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2], rgba[3])
    }

    /// Parse a CSS color string (`#rrggbb`, `rgb(...)`, `rgba(...)`, named colors).
    pub fn parse_css(s: &str) -> RenderResult<Self> {
        let color = csscolorparser::parse(s.trim())
            .map_err(|e| RenderError::validation(format!("invalid color '{s}': {e}")))?;
        Ok(Self::from_array(color.to_rgba8()))
    }

    /// Scale alpha by `factor` (clamped to `[0, 1]`).
    pub fn with_alpha_mul(self, factor: f32) -> Self {
        let f = if factor.is_finite() {
            factor.clamp(0.0, 1.0)
        } else {
            1.0
        };
        Self {
            a: (f32::from(self.a) * f).round() as u8,
            ..self
        }
    }
}

/// `x * y / 255`, rounded to nearest.
pub(crate) fn mul_div255(x: u16, y: u16) -> u16 {
    ((u32::from(x) * u32::from(y) + 127) / 255) as u16
}

/// Premultiply tightly packed straight RGBA8 pixels in place.
pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = mul_div255(u16::from(*c), a) as u8;
        }
    }
}

/// Straight-alpha value of one premultiplied pixel. Transparent pixels become transparent black.
pub(crate) fn unpremultiply_px(px: [u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = px;
    match a {
        0 => [0, 0, 0, 0],
        255 => px,
        _ => {
            let a16 = u16::from(a);
            let un = |c: u8| -> u8 { ((u16::from(c) * 255 + a16 / 2) / a16).min(255) as u8 };
            [un(r), un(g), un(b), a]
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
