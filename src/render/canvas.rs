use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
};

use crate::{
    assets::decode::DecodedImage,
    foundation::core::{Affine, Point, Rect, Rgba8},
    foundation::error::{RenderError, RenderResult},
    render::frame::FrameRGBA,
};

/// Font handle usable for glyph drawing.
#[derive(Clone)]
pub struct CanvasFont {
    font: vello_cpu::peniko::FontData,
}

impl CanvasFont {
    /// Wrap raw font file bytes (face index 0).
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
        }
    }
}

impl std::fmt::Debug for CanvasFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasFont").finish_non_exhaustive()
    }
}

/// One glyph placed in the current user space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionedGlyph {
    /// Glyph id within the font.
    pub id: u32,
    /// Baseline origin x.
    pub x: f32,
    /// Baseline origin y.
    pub y: f32,
}

/// CPU raster target with a save/restore transform stack.
///
/// Every draw call uses the current transform. [`Canvas::save`] returns a guard that restores
/// the transform (and pops any opacity layers pushed under it) when dropped, so early returns
/// through `?` never leak state into later draws.
pub struct Canvas {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
    transform: Affine,
    saved: Vec<Affine>,
    layers: usize,
}

impl Canvas {
    /// Allocate a `width` x `height` pixel canvas with an identity transform.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let w: u16 = width
            .try_into()
            .map_err(|_| RenderError::sizing(format!("canvas width {width} exceeds u16")))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| RenderError::sizing(format!("canvas height {height} exceeds u16")))?;
        if w == 0 || h == 0 {
            return Err(RenderError::sizing(format!(
                "canvas size must be > 0, got {width}x{height}"
            )));
        }
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(w, h),
            width: w,
            height: h,
            transform: Affine::IDENTITY,
            saved: Vec::new(),
            layers: 0,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Current user-to-pixel transform.
    pub fn transform(&self) -> Affine {
        self.transform
    }

    /// Number of open [`CanvasGuard`]s.
    pub fn save_depth(&self) -> usize {
        self.saved.len()
    }

    /// Open a scope; the transform is restored when the guard drops.
    pub fn save(&mut self) -> CanvasGuard<'_> {
        let depth = self.saved.len();
        let layers = self.layers;
        self.saved.push(self.transform);
        CanvasGuard {
            canvas: self,
            depth,
            layers,
        }
    }

    fn restore_to(&mut self, depth: usize, layers: usize) {
        while self.layers > layers {
            self.ctx.pop_layer();
            self.layers -= 1;
        }
        if let Some(t) = self.saved.get(depth).copied() {
            self.transform = t;
        }
        self.saved.truncate(depth);
    }

    /// Post-multiply a scale.
    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.transform *= Affine::scale_non_uniform(sx, sy);
    }

    /// Post-multiply a translation.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.transform *= Affine::translate((dx, dy));
    }

    /// Post-multiply a clockwise rotation of `degrees` about `(cx, cy)`.
    pub fn rotate_about(&mut self, degrees: f64, cx: f64, cy: f64) {
        self.transform *= Affine::rotate_about(degrees.to_radians(), Point::new(cx, cy));
    }

    /// Fill every pixel with `color`, ignoring the current transform.
    pub fn clear(&mut self, color: Rgba8) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(to_cpu_color(color));
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(self.width),
            f64::from(self.height),
        ));
    }

    /// Fill a rectangle in user space.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.ctx.set_transform(affine_to_cpu(self.transform));
        self.ctx.set_paint(to_cpu_color(color));
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    /// Fill a rectangle with rounded corners in user space.
    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: f64, color: Rgba8) {
        if radius <= 0.0 {
            self.fill_rect(rect, color);
            return;
        }
        use vello_cpu::kurbo::Shape as _;
        let path = vello_cpu::kurbo::RoundedRect::new(rect.x0, rect.y0, rect.x1, rect.y1, radius)
            .to_path(0.1);
        self.ctx.set_transform(affine_to_cpu(self.transform));
        self.ctx.set_paint(to_cpu_color(color));
        self.ctx.fill_path(&path);
    }

    /// Draw the whole `image` stretched into `dst` with the given opacity.
    pub fn draw_image_rect(
        &mut self,
        image: &DecodedImage,
        dst: Rect,
        opacity: f32,
    ) -> RenderResult<()> {
        if opacity <= 0.0 || dst.width() <= 0.0 || dst.height() <= 0.0 {
            return Ok(());
        }
        let pixmap = pixmap_from_premul_bytes(&image.rgba8_premul, image.width, image.height)?;
        let paint = vello_cpu::Image {
            image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
            sampler: vello_cpu::peniko::ImageSampler::default(),
        };
        let sx = dst.width() / f64::from(image.width);
        let sy = dst.height() / f64::from(image.height);

        self.ctx.set_transform(affine_to_cpu(
            self.transform * Affine::translate((dst.x0, dst.y0)),
        ));
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy));
        self.ctx.set_paint(paint);
        let layered = opacity < 1.0;
        if layered {
            self.ctx.push_opacity_layer(opacity);
        }
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            dst.width(),
            dst.height(),
        ));
        if layered {
            self.ctx.pop_layer();
        }
        self.ctx
            .set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    /// Fill glyphs of one font at `font_size` with a solid color.
    pub fn fill_glyphs(
        &mut self,
        font: &CanvasFont,
        font_size: f32,
        color: Rgba8,
        glyphs: &[PositionedGlyph],
    ) {
        if glyphs.is_empty() {
            return;
        }
        self.ctx.set_transform(affine_to_cpu(self.transform));
        self.ctx.set_paint(to_cpu_color(color));
        self.ctx
            .glyph_run(&font.font)
            .font_size(font_size)
            .fill_glyphs(glyphs.iter().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            }));
    }

    /// Composite subsequent draws at `opacity` until the enclosing guard drops.
    pub fn push_opacity(&mut self, opacity: f32) {
        self.ctx.push_opacity_layer(opacity.clamp(0.0, 1.0));
        self.layers += 1;
    }

    /// Rasterize everything drawn so far into a premultiplied frame.
    pub fn into_frame(mut self) -> FrameRGBA {
        self.restore_to(0, 0);
        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.render_to_pixmap(&mut pixmap);
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("transform", &self.transform)
            .field("save_depth", &self.saved.len())
            .finish()
    }
}

/// Scope guard returned by [`Canvas::save`].
pub struct CanvasGuard<'a> {
    canvas: &'a mut Canvas,
    depth: usize,
    layers: usize,
}

impl Deref for CanvasGuard<'_> {
    type Target = Canvas;

    fn deref(&self) -> &Canvas {
        self.canvas
    }
}

impl DerefMut for CanvasGuard<'_> {
    fn deref_mut(&mut self) -> &mut Canvas {
        self.canvas
    }
}

impl Drop for CanvasGuard<'_> {
    fn drop(&mut self) {
        self.canvas.restore_to(self.depth, self.layers);
    }
}

fn to_cpu_color(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> RenderResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| RenderError::sizing("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| RenderError::sizing("pixmap height exceeds u16"))?;
    if w == 0 || h == 0 {
        return Err(RenderError::sizing("pixmap must be at least 1x1"));
    }
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(RenderError::validation("pixmap byte len mismatch"));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, true))
}

#[cfg(test)]
#[path = "../../tests/unit/render/canvas.rs"]
mod tests;
