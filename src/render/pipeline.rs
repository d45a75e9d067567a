use std::sync::Arc;

use crate::{
    assets::decode::decode_payload,
    document::record::DocumentRecord,
    encode::codec::{OutputFormat, encode_frame},
    fonts::resolve::FontResolver,
    fonts::store::FontStore,
    foundation::core::{Rect, Rgba8},
    foundation::error::{RenderError, RenderResult},
    legacy::record::LegacyDocumentRecord,
    render::canvas::Canvas,
    render::frame::FrameRGBA,
    render::scale::fit_scale,
    render::text::{ParleyTextRenderer, TextRenderer},
};

/// Per-call rendering options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOpts {
    /// Longest output edge in pixels; `None` renders at canvas size.
    pub max_size: Option<u32>,
    /// Draw text elements through the text renderer; when off they draw their image payload.
    pub render_text: bool,
    /// Output file format.
    pub format: OutputFormat,
    /// JPEG quality in `1..=100`.
    pub jpeg_quality: u8,
    /// Straight RGBA8 clear color.
    pub background: [u8; 4],
}

impl Default for RenderOpts {
    fn default() -> Self {
        Self {
            max_size: Some(360),
            render_text: true,
            format: OutputFormat::Jpeg,
            jpeg_quality: 90,
            background: [255, 255, 255, 255],
        }
    }
}

impl RenderOpts {
    /// Return options with a different output size cap.
    pub fn with_max_size(mut self, max_size: Option<u32>) -> Self {
        self.max_size = max_size;
        self
    }

    /// Return options with text rendering switched on or off.
    pub fn with_render_text(mut self, render_text: bool) -> Self {
        self.render_text = render_text;
        self
    }

    /// Return options with a different output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Return options with a different JPEG quality.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Return options with a different clear color.
    pub fn with_background(mut self, background: [u8; 4]) -> Self {
        self.background = background;
        self
    }
}

/// Document renderer: paints every element of a record onto a fresh canvas and encodes it.
///
/// A renderer owns its text renderer state (registered faces) and may be reused across calls.
/// Use one renderer per thread; the font store is shared read-only.
pub struct Renderer {
    resolver: FontResolver,
    text_renderer: Box<dyn TextRenderer>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    /// Build a renderer over a loaded font store.
    ///
    /// Fails with [`RenderError::Configuration`] if the store was never loaded.
    pub fn new(store: Arc<FontStore>) -> RenderResult<Self> {
        store.ensure_loaded()?;
        Ok(Self {
            resolver: FontResolver::new(store),
            text_renderer: Box::new(ParleyTextRenderer::new()),
        })
    }

    /// Replace the font resolver (for example to change the default family).
    pub fn with_resolver(mut self, resolver: FontResolver) -> RenderResult<Self> {
        resolver.store().ensure_loaded()?;
        self.resolver = resolver;
        Ok(self)
    }

    /// Replace the text renderer.
    pub fn with_text_renderer(mut self, text_renderer: Box<dyn TextRenderer>) -> Self {
        self.text_renderer = text_renderer;
        self
    }

    /// Font resolver used for text elements.
    pub fn resolver(&self) -> &FontResolver {
        &self.resolver
    }

    /// Render a document and encode it in `opts.format`.
    #[tracing::instrument(skip_all, fields(elements = doc.length))]
    pub fn render(&mut self, doc: &DocumentRecord, opts: &RenderOpts) -> RenderResult<Vec<u8>> {
        let frame = self.render_frame(doc, opts)?;
        encode_frame(&frame, opts.format, opts.jpeg_quality, opts.background)
    }

    /// Render a legacy document after converting it to the current format.
    pub fn render_legacy(
        &mut self,
        doc: &LegacyDocumentRecord,
        opts: &RenderOpts,
    ) -> RenderResult<Vec<u8>> {
        self.render(&doc.convert_to_current(), opts)
    }

    /// Render a JSON document of either format; legacy input is detected and converted.
    pub fn render_json(&mut self, json: &str, opts: &RenderOpts) -> RenderResult<Vec<u8>> {
        let doc = parse_document_json(json)?;
        self.render(&doc, opts)
    }

    /// Paint a document into a premultiplied frame without encoding it.
    pub fn render_frame(&mut self, doc: &DocumentRecord, opts: &RenderOpts) -> RenderResult<FrameRGBA> {
        self.resolver.store().ensure_loaded()?;
        doc.validate()?;

        let fit = fit_scale(doc.canvas_width, doc.canvas_height, opts.max_size)?;
        tracing::info!(
            canvas_width = doc.canvas_width,
            canvas_height = doc.canvas_height,
            width = fit.width,
            height = fit.height,
            "rendering document"
        );

        let mut canvas = Canvas::new(fit.width, fit.height)?;
        canvas.scale(fit.sx, fit.sy);
        canvas.clear(Rgba8::from_array(opts.background));

        for i in 0..doc.length {
            self.paint_element(&mut canvas, doc, i, opts, (fit.sx, fit.sy))
                .map_err(|e| match e {
                    RenderError::Other(err) => {
                        RenderError::Other(err.context(format!("element {i}")))
                    }
                    other => other,
                })?;
        }
        Ok(canvas.into_frame())
    }

    fn paint_element(
        &mut self,
        canvas: &mut Canvas,
        doc: &DocumentRecord,
        i: usize,
        opts: &RenderOpts,
        scale: (f64, f64),
    ) -> RenderResult<()> {
        let element = doc.design_element(i)?;
        let mut c = canvas.save();
        c.translate(element.left, element.top);
        if element.angle != 0.0 {
            c.rotate_about(element.angle, element.width / 2.0, element.height / 2.0);
        }

        if element.kind.is_text() && opts.render_text {
            tracing::debug!(index = i, kind = %element.kind, "painting text element");
            let text = doc.text_element(i)?;
            return self
                .text_renderer
                .draw_text(&mut c, &self.resolver, &text);
        }

        tracing::debug!(index = i, kind = %element.kind, "painting image element");
        let bytes = doc.image_payload(i)?.to_bytes()?;
        let svg_size = (
            pixel_extent(element.width * scale.0),
            pixel_extent(element.height * scale.1),
        );
        let image = decode_payload(&bytes, svg_size)?;
        let dst = Rect::new(0.0, 0.0, element.width, element.height);
        c.draw_image_rect(&image, dst, element.opacity as f32)
    }
}

/// Parse a document JSON of either format, converting legacy input.
pub fn parse_document_json(json: &str) -> RenderResult<DocumentRecord> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| RenderError::validation(format!("invalid document json: {e}")))?;
    if LegacyDocumentRecord::detect(&value) {
        tracing::debug!("legacy document detected");
        let legacy: LegacyDocumentRecord = serde_json::from_value(value)
            .map_err(|e| RenderError::validation(format!("invalid legacy document: {e}")))?;
        let doc = legacy.convert_to_current();
        doc.validate()?;
        return Ok(doc);
    }
    let doc: DocumentRecord = serde_json::from_value(value)
        .map_err(|e| RenderError::validation(format!("invalid document record: {e}")))?;
    doc.validate()?;
    Ok(doc)
}

/// Render one document with a fresh renderer and default options.
pub fn render(store: Arc<FontStore>, doc: &DocumentRecord) -> RenderResult<Vec<u8>> {
    Renderer::new(store)?.render(doc, &RenderOpts::default())
}

fn pixel_extent(v: f64) -> u32 {
    if v.is_finite() {
        v.ceil().clamp(1.0, f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
