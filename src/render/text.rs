use std::{borrow::Cow, collections::HashMap, ops::Range};

use crate::{
    document::effects::TextEffect,
    document::map::{MapValue, value_at},
    document::text::{TextAlign, TextElement, TextProperty},
    fonts::face::{FontFace, FontStyle, FontWeight},
    fonts::resolve::FontResolver,
    foundation::core::{Rect, Rgba8, Vec2},
    foundation::error::{RenderError, RenderResult},
    render::canvas::{Canvas, CanvasFont, PositionedGlyph},
};

/// Draws a [`TextElement`] onto a canvas.
///
/// Implementations draw in the canvas' current transform, with the element box spanning
/// `(0, 0)..(width, height)`, and leave the transform as they found it.
pub trait TextRenderer {
    /// Lay out and draw one text element.
    fn draw_text(
        &mut self,
        canvas: &mut Canvas,
        resolver: &FontResolver,
        element: &TextElement,
    ) -> RenderResult<()>;
}

/// Brush attached to every styled range of a layout.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextBrush {
    /// Straight-alpha fill color.
    pub color: Rgba8,
    /// Draw an underline below the run.
    pub underline: bool,
}

#[derive(Clone, Debug)]
struct RegisteredFace {
    family_name: String,
    weight: parley::style::FontWeight,
    style: parley::style::FontStyle,
}

type FaceKey = (String, FontWeight, FontStyle);

/// One glyph run extracted from a finished layout.
#[derive(Clone, Debug)]
struct GlyphBatch {
    font_id: u64,
    font_size: f32,
    brush: TextBrush,
    glyphs: Vec<PositionedGlyph>,
    underline: Option<Rect>,
}

/// Default [`TextRenderer`] backed by parley shaping and line breaking.
///
/// Faces resolved through the [`FontResolver`] are registered once per renderer and reused by
/// later elements. Only store fonts are visible to layout; system fonts are never consulted.
pub struct ParleyTextRenderer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    faces: HashMap<FaceKey, RegisteredFace>,
    fonts: HashMap<u64, CanvasFont>,
}

impl Default for ParleyTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ParleyTextRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParleyTextRenderer")
            .field("registered_faces", &self.faces.len())
            .finish_non_exhaustive()
    }
}

impl ParleyTextRenderer {
    /// Construct a renderer with fresh parley contexts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            faces: HashMap::new(),
            fonts: HashMap::new(),
        }
    }

    /// Number of distinct faces registered so far.
    pub fn registered_faces(&self) -> usize {
        self.faces.len()
    }

    fn register(&mut self, face: &FontFace) -> RenderResult<RegisteredFace> {
        let key = (face.font_family.clone(), face.font_weight, face.font_style);
        if let Some(found) = self.faces.get(&key) {
            return Ok(found.clone());
        }

        let blob = parley::fontique::Blob::from(face.bytes.clone());
        let font_id = blob.id();
        let families = self.font_ctx.collection.register_fonts(blob, None);
        let (family_id, infos) = families.first().ok_or_else(|| {
            RenderError::validation(format!(
                "no font families registered from face '{}' {} {}",
                face.font_family, face.font_weight, face.font_style
            ))
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(*family_id)
            .ok_or_else(|| RenderError::validation("registered font family has no name"))?
            .to_string();
        let (weight, style) = infos
            .first()
            .map(|info| (info.weight(), info.style()))
            .unwrap_or((
                parley::style::FontWeight::NORMAL,
                parley::style::FontStyle::Normal,
            ));

        tracing::debug!(
            family = %face.font_family,
            registered_as = %family_name,
            weight = %face.font_weight,
            style = %face.font_style,
            "registered font face"
        );
        let out = RegisteredFace {
            family_name,
            weight,
            style,
        };
        self.fonts
            .insert(font_id, CanvasFont::from_bytes(face.bytes.clone()));
        self.faces.insert(key, out.clone());
        Ok(out)
    }

    fn layout_batches(
        &mut self,
        resolver: &FontResolver,
        element: &TextElement,
    ) -> RenderResult<Vec<GlyphBatch>> {
        let props = &element.props;
        let shaped = ShapedText::build(props);

        let mut face_slots: Vec<RegisteredFace> = Vec::new();
        let mut slot_of: HashMap<(FontWeight, FontStyle), usize> = HashMap::new();
        let mut slot_for = |this: &mut Self, weight: FontWeight, style: FontStyle| {
            if let Some(&slot) = slot_of.get(&(weight, style)) {
                return Ok::<usize, RenderError>(slot);
            }
            let face = resolver.resolve_typed(&props.font, weight, style)?;
            let registered = this.register(face)?;
            face_slots.push(registered);
            slot_of.insert((weight, style), face_slots.len() - 1);
            Ok(face_slots.len() - 1)
        };

        let default_slot = slot_for(self, FontWeight::Regular, FontStyle::Regular)?;
        let mut runs: Vec<(Range<usize>, usize, TextBrush)> = Vec::new();
        for (range, source) in &shaped.spans {
            let (slot, brush) = match source {
                Some(i) => {
                    let (weight, style) = face_request(props, *i);
                    (slot_for(self, weight, style)?, char_brush(props, *i))
                }
                None => (default_slot, TextBrush::default()),
            };
            match runs.last_mut() {
                Some((r, s, b)) if *s == slot && *b == brush && r.end == range.start => {
                    r.end = range.end;
                }
                _ => runs.push((range.clone(), slot, brush)),
            }
        }

        let font_size = props.font_size as f32;
        let width = element.element.width as f32;
        let default_face = face_slots[default_slot].clone();

        let mut builder =
            self.layout_ctx
                .ranged_builder(&mut self.font_ctx, &shaped.text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(default_face.family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontWeight(default_face.weight));
        builder.push_default(parley::style::StyleProperty::FontStyle(default_face.style));
        builder.push_default(parley::style::StyleProperty::FontSize(font_size));
        builder.push_default(parley::style::StyleProperty::LetterSpacing(
            props.letter_spacing as f32,
        ));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrush {
            color: Rgba8::BLACK,
            underline: false,
        }));
        for (range, slot, brush) in &runs {
            let face = &face_slots[*slot];
            builder.push(
                parley::style::StyleProperty::FontStack(parley::style::FontStack::Source(
                    Cow::Owned(face.family_name.clone()),
                )),
                range.clone(),
            );
            builder.push(
                parley::style::StyleProperty::FontWeight(face.weight),
                range.clone(),
            );
            builder.push(
                parley::style::StyleProperty::FontStyle(face.style),
                range.clone(),
            );
            builder.push(parley::style::StyleProperty::Brush(*brush), range.clone());
        }

        let mut layout: parley::Layout<TextBrush> = builder.build(&shaped.text);
        layout.break_all_lines(Some(width));
        layout.align(
            Some(width),
            alignment(props.text_align),
            parley::AlignmentOptions::default(),
        );

        let pitch = (props.line_height * props.font_size) as f32;
        let mut batches = Vec::new();
        for (line_idx, line) in layout.lines().enumerate() {
            let m = line.metrics();
            let target = line_idx as f32 * pitch + (pitch - m.ascent - m.descent) / 2.0 + m.ascent;
            let dy = target - m.baseline;
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                let run_font_size = run.run().font_size();
                let glyphs: Vec<PositionedGlyph> = run
                    .positioned_glyphs()
                    .map(|g| PositionedGlyph {
                        id: g.id,
                        x: g.x,
                        y: g.y + dy,
                    })
                    .collect();
                let underline = brush.underline.then(|| {
                    let y = f64::from(target + run_font_size * 0.1);
                    let thickness = f64::from((run_font_size / 16.0).max(0.5));
                    Rect::new(
                        f64::from(run.offset()),
                        y,
                        f64::from(run.offset() + run.advance()),
                        y + thickness,
                    )
                });
                batches.push(GlyphBatch {
                    font_id: run.run().font().data.id(),
                    font_size: run_font_size,
                    brush,
                    glyphs,
                    underline,
                });
            }
        }
        Ok(batches)
    }

    fn paint_batches(
        &self,
        canvas: &mut Canvas,
        batches: &[GlyphBatch],
        offset: Vec2,
        tint: Option<Rgba8>,
        alpha: f32,
    ) {
        for batch in batches {
            let Some(font) = self.fonts.get(&batch.font_id) else {
                tracing::warn!(font_id = batch.font_id, "glyph run uses an unregistered font");
                continue;
            };
            let color = tint.unwrap_or(batch.brush.color).with_alpha_mul(alpha);
            let (dx, dy) = (offset.x as f32, offset.y as f32);
            let glyphs: Vec<PositionedGlyph> = batch
                .glyphs
                .iter()
                .map(|g| PositionedGlyph {
                    x: g.x + dx,
                    y: g.y + dy,
                    ..*g
                })
                .collect();
            canvas.fill_glyphs(font, batch.font_size, color, &glyphs);
            if let Some(rect) = batch.underline {
                canvas.fill_rect(rect + offset, color);
            }
        }
    }
}

impl TextRenderer for ParleyTextRenderer {
    #[tracing::instrument(skip_all, fields(uuid = %element.element.uuid))]
    fn draw_text(
        &mut self,
        canvas: &mut Canvas,
        resolver: &FontResolver,
        element: &TextElement,
    ) -> RenderResult<()> {
        let batches = self.layout_batches(resolver, element)?;
        let effects: Vec<&TextEffect> = element
            .props
            .effects
            .iter()
            .flatten()
            .filter(|e| e.enabled())
            .collect();

        let mut c = canvas.save();
        let opacity = element.element.opacity as f32;
        if opacity < 1.0 {
            c.push_opacity(opacity);
        }

        for effect in &effects {
            if let TextEffect::TextBox {
                color,
                blend_opacity,
                spread,
                radius,
                ..
            } = effect
            {
                let fill = effect_color(color)?.with_alpha_mul(*blend_opacity as f32);
                let rect = Rect::new(0.0, 0.0, element.element.width, element.element.height)
                    .inflate(*spread, *spread);
                c.fill_rounded_rect(rect, *radius, fill);
            }
        }

        for effect in &effects {
            match effect {
                TextEffect::TextBox { .. } => {}
                TextEffect::DropShadow {
                    color,
                    opacity,
                    blend_opacity,
                    distance,
                    angle,
                    ..
                } => {
                    let tint = effect_color(color)?;
                    let alpha = (*opacity * *blend_opacity) as f32;
                    self.paint_batches(&mut c, &batches, polar(*distance, *angle), Some(tint), alpha);
                }
                TextEffect::Echo {
                    distance, angle, ..
                } => {
                    self.paint_batches(&mut c, &batches, polar(*distance, *angle), None, 0.5);
                }
                other => {
                    tracing::debug!(effect = other.kind(), "text effect not drawn");
                }
            }
        }

        self.paint_batches(&mut c, &batches, Vec2::ZERO, None, 1.0);
        Ok(())
    }
}

/// Text as laid out, with each span tied back to its source character.
#[derive(Debug, Default)]
struct ShapedText {
    text: String,
    /// Byte range in `text` and the source character index; `None` marks inserted breaks.
    spans: Vec<(Range<usize>, Option<usize>)>,
}

impl ShapedText {
    fn build(props: &TextProperty) -> Self {
        let mut out = Self::default();
        let mut prev: Option<(char, Option<&MapValue>)> = None;
        for (i, c) in props.text.chars().enumerate() {
            let line = value_at(props.line_map(), i);
            if let Some((prev_c, prev_line)) = prev
                && prev_line != line
                && prev_c != '\n'
                && c != '\n'
            {
                out.push('\n', None);
            }
            if props.capitalize {
                for up in c.to_uppercase() {
                    out.push(up, Some(i));
                }
            } else {
                out.push(c, Some(i));
            }
            prev = Some((c, line));
        }
        out
    }

    fn push(&mut self, c: char, source: Option<usize>) {
        let start = self.text.len();
        self.text.push(c);
        self.spans.push((start..self.text.len(), source));
    }
}

fn face_request(props: &TextProperty, i: usize) -> (FontWeight, FontStyle) {
    let flag = |map: &Option<Vec<crate::document::map::TextMapItem>>| {
        map.as_deref()
            .and_then(|m| value_at(m, i))
            .is_some_and(MapValue::as_bool)
    };
    let bold = flag(&props.bold_map);
    let italic = flag(&props.italic_map);

    let weight = props
        .weight_map
        .as_deref()
        .and_then(|m| value_at(m, i))
        .and_then(|v| match v {
            MapValue::Text(s) => FontWeight::from_keyword(&s.to_ascii_lowercase()),
            MapValue::Number(n) if n.is_finite() && *n > 0.0 => {
                Some(FontWeight::from_numeric(n.round().min(1000.0) as u16))
            }
            _ => None,
        })
        .unwrap_or(if bold {
            FontWeight::Bold
        } else {
            FontWeight::Regular
        });

    let style = props
        .style_map
        .as_deref()
        .and_then(|m| value_at(m, i))
        .and_then(MapValue::as_str)
        .and_then(|s| FontStyle::from_keyword(&s.to_ascii_lowercase()))
        .unwrap_or_else(|| FontStyle::from_flags(weight.is_bold(), italic));
    (weight, style)
}

fn char_brush(props: &TextProperty, i: usize) -> TextBrush {
    let color = match value_at(&props.color_map, i).and_then(MapValue::as_str) {
        Some(css) => Rgba8::parse_css(css).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "falling back to black text");
            Rgba8::BLACK
        }),
        None => Rgba8::BLACK,
    };
    let alpha = props
        .opacity_map
        .as_deref()
        .and_then(|m| value_at(m, i))
        .and_then(MapValue::as_f64)
        .unwrap_or(1.0);
    let underline = props
        .underline_map
        .as_deref()
        .and_then(|m| value_at(m, i))
        .map(MapValue::as_bool)
        .unwrap_or(props.underline.unwrap_or(false));
    TextBrush {
        color: color.with_alpha_mul(alpha as f32),
        underline,
    }
}

fn alignment(align: TextAlign) -> parley::Alignment {
    match align {
        TextAlign::Left => parley::Alignment::Left,
        TextAlign::Right => parley::Alignment::Right,
        TextAlign::Center => parley::Alignment::Center,
        TextAlign::Justify => parley::Alignment::Justify,
    }
}

fn effect_color(css: &str) -> RenderResult<Rgba8> {
    Rgba8::parse_css(css)
}

/// Offset of `distance` along `angle` degrees, clockwise from +x.
fn polar(distance: f64, angle: f64) -> Vec2 {
    let (sin, cos) = angle.to_radians().sin_cos();
    Vec2::new(distance * cos, distance * sin)
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
