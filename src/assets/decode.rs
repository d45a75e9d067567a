use std::sync::Arc;

use anyhow::Context;

use crate::foundation::{
    core::premultiply_rgba8_in_place,
    error::{RenderError, RenderResult},
};

/// Largest raster edge produced for SVG payloads.
const MAX_SVG_DIM: u32 = 16_384;

/// Decoded image pixels ready for drawing.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, tightly packed, row-major.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode raster image bytes (PNG, JPEG, WebP, ...) to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> RenderResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Return `true` when `bytes` look like an SVG document.
pub fn is_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

/// Rasterize SVG bytes to `width` x `height` premultiplied RGBA8, stretching the viewport.
pub fn rasterize_svg(bytes: &[u8], width: u32, height: u32) -> RenderResult<DecodedImage> {
    if width == 0 || height == 0 || width > MAX_SVG_DIM || height > MAX_SVG_DIM {
        return Err(RenderError::sizing(format!(
            "svg raster size {width}x{height} outside 1..={MAX_SVG_DIM}"
        )));
    }
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RenderError::sizing("failed to allocate svg pixmap"))?;
    let sx = width as f32 / tree.size().width();
    let sy = height as f32 / tree.size().height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    Ok(DecodedImage {
        width,
        height,
        rgba8_premul: Arc::new(pixmap.data().to_vec()),
    })
}

/// Decode an image payload of either kind.
///
/// Raster payloads keep their intrinsic size; SVG payloads are rasterized at `svg_size`.
pub fn decode_payload(bytes: &[u8], svg_size: (u32, u32)) -> RenderResult<DecodedImage> {
    if bytes.is_empty() {
        return Err(RenderError::validation("image payload is empty"));
    }
    if is_svg(bytes) {
        rasterize_svg(bytes, svg_size.0, svg_size.1)
    } else {
        decode_image(bytes)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
