use std::sync::OnceLock;

use serde_json::json;

use super::*;

fn store() -> Arc<FontStore> {
    static STORE: OnceLock<Arc<FontStore>> = OnceLock::new();
    STORE
        .get_or_init(|| Arc::new(FontStore::from_font_dir("tests/data/fonts").unwrap()))
        .clone()
}

fn renderer() -> Renderer {
    let resolver = FontResolver::new(store()).with_default_family("DejaVu Sans");
    Renderer::new(store()).unwrap().with_resolver(resolver).unwrap()
}

fn png(rgba: [u8; 4], w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut out = std::io::Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

struct El {
    kind: &'static str,
    rect: [f64; 4],
    angle: f64,
    opacity: f64,
    image: Option<Vec<u8>>,
}

fn image_el(rect: [f64; 4], rgba: [u8; 4]) -> El {
    El {
        kind: "ImageElement",
        rect,
        angle: 0.0,
        opacity: 1.0,
        image: Some(png(rgba, 4, 4)),
    }
}

fn doc(canvas: (f64, f64), els: &[El]) -> DocumentRecord {
    let v = json!({
        "canvas_width": canvas.0,
        "canvas_height": canvas.1,
        "length": els.len(),
        "left": els.iter().map(|e| e.rect[0]).collect::<Vec<_>>(),
        "top": els.iter().map(|e| e.rect[1]).collect::<Vec<_>>(),
        "width": els.iter().map(|e| e.rect[2]).collect::<Vec<_>>(),
        "height": els.iter().map(|e| e.rect[3]).collect::<Vec<_>>(),
        "angle": els.iter().map(|e| e.angle).collect::<Vec<_>>(),
        "opacity": els.iter().map(|e| e.opacity).collect::<Vec<_>>(),
        "type": els.iter().map(|e| e.kind).collect::<Vec<_>>(),
        "image": els.iter().map(|e| e.image.clone()).collect::<Vec<_>>(),
    });
    serde_json::from_value(v).unwrap()
}

fn text_doc(text: &str) -> DocumentRecord {
    let n = text.chars().count();
    let v = json!({
        "canvas_width": 200.0,
        "canvas_height": 60.0,
        "length": 1,
        "left": [0.0], "top": [0.0], "width": [200.0], "height": [60.0],
        "type": ["textElement"],
        "text": [text],
        "font": ["DejaVu Sans"],
        "font_size": [24.0],
        "line_height": [1.2],
        "text_align": ["left"],
        "capitalize": [false],
        "letter_spacing": [0.0],
        "font_bold": [vec![false; n]],
        "font_italic": [vec![false; n]],
        "text_color": [vec!["#000000"; n]],
        "text_line": [vec![0; n]],
    });
    serde_json::from_value(v).unwrap()
}

fn close(px: Option<[u8; 4]>, want: [u8; 4], tol: u8) -> bool {
    px.is_some_and(|p| p.iter().zip(want).all(|(a, b)| a.abs_diff(b) <= tol))
}

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];

#[test]
fn opts_defaults_and_builders() {
    let o = RenderOpts::default();
    assert_eq!(o.max_size, Some(360));
    assert!(o.render_text);
    assert_eq!(o.format, OutputFormat::Jpeg);
    assert_eq!(o.jpeg_quality, 90);
    assert_eq!(o.background, WHITE);

    let o = o
        .with_max_size(None)
        .with_render_text(false)
        .with_format(OutputFormat::Png)
        .with_jpeg_quality(70)
        .with_background([0, 0, 0, 255]);
    assert_eq!(o.max_size, None);
    assert!(!o.render_text);
    assert_eq!(o.format, OutputFormat::Png);
    assert_eq!(o.jpeg_quality, 70);
}

#[test]
fn renderer_requires_loaded_store() {
    let err = Renderer::new(Arc::new(FontStore::new())).unwrap_err();
    assert!(matches!(err, RenderError::Configuration(_)));
}

#[test]
fn image_element_fills_its_box() {
    let d = doc((100.0, 100.0), &[image_el([10.0, 10.0, 50.0, 50.0], RED)]);
    let frame = renderer()
        .render_frame(&d, &RenderOpts::default().with_max_size(None))
        .unwrap();
    assert_eq!((frame.width, frame.height), (100, 100));
    assert!(close(frame.pixel(30, 30), RED, 2));
    assert!(close(frame.pixel(5, 5), WHITE, 0));
    assert!(close(frame.pixel(80, 80), WHITE, 0));
}

#[test]
fn fit_scale_shrinks_canvas_and_geometry() {
    let d = doc((1000.0, 500.0), &[image_el([500.0, 0.0, 500.0, 500.0], RED)]);
    let frame = renderer().render_frame(&d, &RenderOpts::default()).unwrap();
    assert_eq!((frame.width, frame.height), (360, 180));
    assert!(close(frame.pixel(270, 90), RED, 2));
    assert!(close(frame.pixel(90, 90), WHITE, 0));
}

#[test]
fn rotation_turns_about_element_center() {
    let mut el = image_el([30.0, 45.0, 40.0, 10.0], RED);
    el.angle = 90.0;
    let d = doc((100.0, 100.0), &[el]);
    let frame = renderer()
        .render_frame(&d, &RenderOpts::default().with_max_size(None))
        .unwrap();
    assert!(close(frame.pixel(50, 35), RED, 2));
    assert!(close(frame.pixel(35, 50), WHITE, 0));
}

#[test]
fn opacity_blends_over_background() {
    let mut el = image_el([0.0, 0.0, 20.0, 20.0], RED);
    el.opacity = 0.5;
    let d = doc((20.0, 20.0), &[el]);
    let frame = renderer()
        .render_frame(&d, &RenderOpts::default().with_max_size(None))
        .unwrap();
    assert!(close(frame.pixel(10, 10), [255, 128, 128, 255], 3));
}

#[test]
fn later_elements_paint_over_earlier_ones() {
    let d = doc(
        (40.0, 40.0),
        &[
            image_el([0.0, 0.0, 40.0, 40.0], RED),
            image_el([0.0, 0.0, 20.0, 40.0], BLUE),
        ],
    );
    let frame = renderer()
        .render_frame(&d, &RenderOpts::default().with_max_size(None))
        .unwrap();
    assert!(close(frame.pixel(10, 20), BLUE, 2));
    assert!(close(frame.pixel(30, 20), RED, 2));
}

#[test]
fn text_disabled_draws_the_payload() {
    let mut el = image_el([0.0, 0.0, 20.0, 20.0], BLUE);
    el.kind = "TextElement";
    let d = doc((20.0, 20.0), &[el]);
    let opts = RenderOpts::default().with_max_size(None).with_render_text(false);
    let frame = renderer().render_frame(&d, &opts).unwrap();
    assert!(close(frame.pixel(10, 10), BLUE, 2));
}

#[test]
fn missing_payload_aborts_the_render() {
    let mut el = image_el([0.0, 0.0, 20.0, 20.0], BLUE);
    el.image = None;
    let d = doc((20.0, 20.0), &[image_el([0.0, 0.0, 5.0, 5.0], RED), el]);
    let err = renderer().render(&d, &RenderOpts::default()).unwrap_err();
    assert!(matches!(err, RenderError::Validation(_)));
}

#[test]
fn unknown_kind_is_rejected() {
    let mut el = image_el([0.0, 0.0, 20.0, 20.0], BLUE);
    el.kind = "VideoElement";
    let d = doc((20.0, 20.0), &[el]);
    assert!(matches!(
        renderer().render(&d, &RenderOpts::default()),
        Err(RenderError::Validation(_))
    ));
}

#[test]
fn text_element_draws_glyphs() {
    let frame = renderer()
        .render_frame(&text_doc("Hello"), &RenderOpts::default())
        .unwrap();
    let dark = frame
        .data
        .chunks_exact(4)
        .filter(|px| px[0] < 128 && px[3] == 255)
        .count();
    assert!(dark > 20, "dark pixels: {dark}");
}

#[test]
fn rendering_is_deterministic() {
    let d = text_doc("Same twice");
    let a = renderer().render(&d, &RenderOpts::default()).unwrap();
    let b = renderer().render(&d, &RenderOpts::default()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn output_formats_have_their_signatures() {
    let d = doc((10.0, 10.0), &[image_el([0.0, 0.0, 10.0, 10.0], RED)]);
    let mut r = renderer();
    let jpeg = r.render(&d, &RenderOpts::default()).unwrap();
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    let png = r
        .render(&d, &RenderOpts::default().with_format(OutputFormat::Png))
        .unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[test]
fn json_entry_point_detects_legacy_documents() {
    let legacy = json!({
        "canvas_width": 100.0,
        "canvas_height": 50.0,
        "length": 1,
        "left": [0.1], "top": [0.2], "width": [0.5], "height": [0.5],
        "angle": [0.0], "opacity": [1.0],
        "type": ["imageElement"],
        "color": [[0, 0, 0]],
        "image": [png(RED, 2, 2)],
        "capitalize": ["false"],
    });
    let d = parse_document_json(&legacy.to_string()).unwrap();
    assert_eq!(d.kind, vec!["ImageElement".to_string()]);
    assert_eq!(d.left, vec![10.0]);

    let current = doc((10.0, 10.0), &[image_el([0.0, 0.0, 10.0, 10.0], RED)]);
    let json = serde_json::to_string(&current).unwrap();
    let back = parse_document_json(&json).unwrap();
    assert_eq!(back.left, current.left);

    assert!(matches!(
        parse_document_json("{not json"),
        Err(RenderError::Validation(_))
    ));
}

#[test]
fn pixel_extent_rounds_up_to_at_least_one() {
    assert_eq!(pixel_extent(0.2), 1);
    assert_eq!(pixel_extent(10.1), 11);
    assert_eq!(pixel_extent(f64::NAN), 1);
}

#[test]
fn legacy_text_opacity_is_applied_once() {
    let legacy = json!({
        "canvas_width": 200,
        "canvas_height": 80,
        "length": 1,
        "left": [0.0], "top": [0.0], "width": [1.0], "height": [1.0],
        "angle": [0.0], "opacity": [0.5],
        "type": ["textElement"],
        "color": [[0, 0, 0]],
        "image": [null],
        "text": ["MMMM"],
        "font": ["DejaVu Sans"],
        "font_size": [40.0],
        "line_height": [1.2],
        "text_align": ["left"],
        "capitalize": ["false"],
        "letter_spacing": [0.0],
    });
    let doc = parse_document_json(&legacy.to_string()).unwrap();
    assert_eq!(doc.text_color[0][0], "rgba(0,0,0,0.5)");

    let frame = renderer()
        .render_frame(&doc, &RenderOpts::default().with_max_size(None))
        .unwrap();
    let darkest = frame
        .data
        .chunks_exact(4)
        .map(|px| px[0])
        .min()
        .unwrap();
    assert!((122..=134).contains(&darkest), "darkest red channel: {darkest}");
}
