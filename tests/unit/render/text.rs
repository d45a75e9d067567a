use std::sync::{Arc, OnceLock};

use super::*;
use crate::{
    document::element::{DesignElement, ElementKind},
    document::map::TextMapItem,
    fonts::store::FontStore,
};

fn store() -> Arc<FontStore> {
    static STORE: OnceLock<Arc<FontStore>> = OnceLock::new();
    STORE
        .get_or_init(|| Arc::new(FontStore::from_font_dir("tests/data/fonts").unwrap()))
        .clone()
}

fn resolver() -> FontResolver {
    FontResolver::new(store()).with_default_family("DejaVu Sans")
}

fn props(text: &str) -> TextProperty {
    TextProperty::new(
        text,
        "DejaVu Sans",
        24.0,
        1.2,
        TextAlign::Left,
        vec![TextMapItem::new(0, 100, "#000000")],
    )
    .unwrap()
}

fn element(props: TextProperty, w: f64, h: f64) -> TextElement {
    TextElement::new(
        DesignElement::new("t", ElementKind::Text, w, h).unwrap(),
        props,
    )
    .unwrap()
}

fn dark_pixels(frame: &crate::render::frame::FrameRGBA) -> usize {
    (0..frame.height)
        .flat_map(|y| (0..frame.width).map(move |x| (x, y)))
        .filter(|&(x, y)| frame.pixel(x, y).is_some_and(|p| p[0] < 128))
        .count()
}

#[test]
fn capitalize_maps_every_uppercase_char_to_its_source() {
    let mut p = props("aß");
    p.capitalize = true;
    let shaped = ShapedText::build(&p);
    assert_eq!(shaped.text, "ASS");
    let sources: Vec<Option<usize>> = shaped.spans.iter().map(|(_, s)| *s).collect();
    assert_eq!(sources, vec![Some(0), Some(1), Some(1)]);
}

#[test]
fn line_map_changes_insert_hard_breaks() {
    let p = props("abcd").with_line_map(vec![
        TextMapItem::new(0, 1, 0i64),
        TextMapItem::new(2, 3, 1i64),
    ]);
    let shaped = ShapedText::build(&p);
    assert_eq!(shaped.text, "ab\ncd");
    assert_eq!(shaped.spans[2].1, None);

    let p = props("ab\ncd").with_line_map(vec![
        TextMapItem::new(0, 1, 0i64),
        TextMapItem::new(2, 4, 1i64),
    ]);
    assert_eq!(ShapedText::build(&p).text, "ab\ncd");

    assert_eq!(ShapedText::build(&props("abcd")).text, "abcd");
}

#[test]
fn face_request_follows_bold_italic_and_weight_maps() {
    let p = props("abcd")
        .with_bold_map(vec![TextMapItem::new(0, 1, true)])
        .with_italic_map(vec![TextMapItem::new(1, 2, true)]);
    assert_eq!(face_request(&p, 0), (FontWeight::Bold, FontStyle::Bold));
    assert_eq!(face_request(&p, 1), (FontWeight::Bold, FontStyle::BoldItalic));
    assert_eq!(face_request(&p, 2), (FontWeight::Regular, FontStyle::Italic));
    assert_eq!(face_request(&p, 3), (FontWeight::Regular, FontStyle::Regular));

    let mut p = props("ab");
    p.weight_map = Some(vec![
        TextMapItem::new(0, 0, "Light"),
        TextMapItem::new(1, 1, 600.0),
    ]);
    assert_eq!(face_request(&p, 0).0, FontWeight::Light);
    assert_eq!(face_request(&p, 1).0, FontWeight::SemiBold);
}

#[test]
fn brush_combines_color_opacity_and_underline() {
    let mut p = props("ab");
    p.color_map = vec![TextMapItem::new(0, 1, "rgba(255,0,0,1)")];
    p.opacity_map = Some(vec![TextMapItem::new(1, 1, 0.5)]);
    p.underline_map = Some(vec![TextMapItem::new(0, 0, true)]);

    let a = char_brush(&p, 0);
    assert_eq!(a.color, Rgba8::new(255, 0, 0, 255));
    assert!(a.underline);
    let b = char_brush(&p, 1);
    assert_eq!(b.color.a, 128);
    assert!(!b.underline);

    p.color_map = vec![TextMapItem::new(0, 1, "not-a-color")];
    assert_eq!(char_brush(&p, 0).color, Rgba8::BLACK);
}

#[test]
fn polar_offset_points_clockwise() {
    let v = polar(10.0, 90.0);
    assert!(v.x.abs() < 1e-9 && (v.y - 10.0).abs() < 1e-9);
}

#[test]
fn draws_glyphs_inside_element_box_and_restores_transform() {
    let mut canvas = Canvas::new(200, 60).unwrap();
    canvas.clear(Rgba8::WHITE);
    let before = canvas.transform();
    let mut renderer = ParleyTextRenderer::new();
    renderer
        .draw_text(&mut canvas, &resolver(), &element(props("Hello"), 200.0, 60.0))
        .unwrap();
    assert_eq!(canvas.transform(), before);
    assert_eq!(canvas.save_depth(), 0);
    assert!(dark_pixels(&canvas.into_frame()) > 20);
}

#[test]
fn bold_ranges_register_a_second_face() {
    let mut canvas = Canvas::new(200, 60).unwrap();
    let mut renderer = ParleyTextRenderer::new();
    let p = props("Hello").with_bold_map(vec![TextMapItem::new(0, 1, true)]);
    renderer
        .draw_text(&mut canvas, &resolver(), &element(p, 200.0, 60.0))
        .unwrap();
    assert_eq!(renderer.registered_faces(), 2);
}

#[test]
fn empty_text_draws_nothing() {
    let mut canvas = Canvas::new(20, 20).unwrap();
    canvas.clear(Rgba8::WHITE);
    let mut renderer = ParleyTextRenderer::new();
    renderer
        .draw_text(&mut canvas, &resolver(), &element(props(""), 20.0, 20.0))
        .unwrap();
    assert_eq!(dark_pixels(&canvas.into_frame()), 0);
}

#[test]
fn text_box_fills_element_background() {
    let mut canvas = Canvas::new(100, 40).unwrap();
    canvas.clear(Rgba8::WHITE);
    let p = props("x").with_effects(vec![TextEffect::TextBox {
        enabled: true,
        color: "#0000ff".into(),
        blend_opacity: 1.0,
        spread: 0.0,
        radius: 0.0,
    }]);
    let mut renderer = ParleyTextRenderer::new();
    renderer
        .draw_text(&mut canvas, &resolver(), &element(p, 100.0, 40.0))
        .unwrap();
    assert_eq!(canvas.into_frame().pixel(90, 35), Some([0, 0, 255, 255]));
}

#[test]
fn disabled_and_undrawn_effects_leave_background() {
    let mut canvas = Canvas::new(100, 40).unwrap();
    canvas.clear(Rgba8::WHITE);
    let p = props("x").with_effects(vec![
        TextEffect::TextBox {
            enabled: false,
            color: "#0000ff".into(),
            blend_opacity: 1.0,
            spread: 0.0,
            radius: 0.0,
        },
        TextEffect::Glitch {
            enabled: true,
            size: 3.0,
            angle: 0.0,
        },
    ]);
    let mut renderer = ParleyTextRenderer::new();
    renderer
        .draw_text(&mut canvas, &resolver(), &element(p, 100.0, 40.0))
        .unwrap();
    assert_eq!(canvas.into_frame().pixel(90, 35), Some([255, 255, 255, 255]));
}

#[test]
fn invalid_effect_color_fails_the_element() {
    let mut canvas = Canvas::new(40, 40).unwrap();
    let p = props("x").with_effects(vec![TextEffect::DropShadow {
        enabled: true,
        color: "nope".into(),
        opacity: 1.0,
        blend_opacity: 1.0,
        size: 0.0,
        blur: 0.0,
        distance: 2.0,
        angle: 45.0,
    }]);
    let mut renderer = ParleyTextRenderer::new();
    let res = renderer.draw_text(&mut canvas, &resolver(), &element(p, 40.0, 40.0));
    assert!(matches!(res, Err(RenderError::Validation(_))));
    assert_eq!(canvas.save_depth(), 0);
}
