use crate::foundation::error::{RenderError, RenderResult};

/// Canvas-to-pixel scale and the resulting raster size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitScale {
    /// Horizontal scale factor.
    pub sx: f64,
    /// Vertical scale factor.
    pub sy: f64,
    /// Raster width in pixels, >= 1.
    pub width: u32,
    /// Raster height in pixels, >= 1.
    pub height: u32,
}

/// Shrink a `width` x `height` canvas to fit within `max_size` pixels on its longer edge.
///
/// Never upscales. `None` keeps the canvas size. Sizes round half-to-even. When an axis rounds
/// to zero pixels its scale becomes `1 / dimension` so that axis is exactly one pixel, which
/// makes `sx != sy` in that case.
pub fn fit_scale(width: f64, height: f64, max_size: Option<u32>) -> RenderResult<FitScale> {
    if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
        return Err(RenderError::sizing(format!(
            "canvas size must be finite and > 0, got {width}x{height}"
        )));
    }

    let s = match max_size {
        None => 1.0,
        Some(m) => (f64::from(m) / width.max(height)).min(1.0),
    };
    let (mut sx, mut sy) = (s, s);
    if (width * sx).round_ties_even() <= 0.0 {
        sx = 1.0 / width;
    }
    if (height * sy).round_ties_even() <= 0.0 {
        sy = 1.0 / height;
    }

    let w = (sx * width).round_ties_even();
    let h = (sy * height).round_ties_even();
    if !(w > 0.0 && h > 0.0) || w > f64::from(u32::MAX) || h > f64::from(u32::MAX) {
        return Err(RenderError::sizing(format!(
            "failed to compute raster size: {w}x{h} for canvas {width}x{height}"
        )));
    }
    Ok(FitScale {
        sx,
        sy,
        width: w as u32,
        height: h as u32,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/scale.rs"]
mod tests;
