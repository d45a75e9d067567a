use serde_json::json;

use super::*;

fn store() -> Arc<FontStore> {
    Arc::new(FontStore::from_font_dir("tests/data/fonts").unwrap())
}

fn solid_doc(rgba: [u8; 4], width: f64) -> DocumentRecord {
    let img = image::RgbaImage::from_pixel(2, 2, image::Rgba(rgba));
    let mut png = std::io::Cursor::new(Vec::new());
    img.write_to(&mut png, image::ImageFormat::Png).unwrap();
    serde_json::from_value(json!({
        "canvas_width": width,
        "canvas_height": 10.0,
        "length": 1,
        "left": [0.0], "top": [0.0], "width": [width], "height": [10.0],
        "type": ["ImageElement"],
        "image": [png.into_inner()],
    }))
    .unwrap()
}

#[test]
fn results_keep_input_order() {
    let docs: Vec<DocumentRecord> = (1..=6)
        .map(|i| solid_doc([0, 0, 255, 255], i as f64 * 10.0))
        .collect();
    let opts = RenderOpts::default()
        .with_max_size(None)
        .with_format(crate::encode::codec::OutputFormat::Png);
    let out = render_batch(store(), &docs, &opts, Some(3)).unwrap();
    assert_eq!(out.len(), docs.len());
    for (i, res) in out.into_iter().enumerate() {
        let bytes = res.unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!(img.width(), (i as u32 + 1) * 10);
    }
}

#[test]
fn failing_documents_do_not_hide_others() {
    let mut bad = solid_doc([255, 0, 0, 255], 10.0);
    bad.image = vec![None];
    let docs = vec![solid_doc([255, 0, 0, 255], 10.0), bad];
    let out = render_batch(store(), &docs, &RenderOpts::default(), None).unwrap();
    assert!(out[0].is_ok());
    assert!(matches!(out[1], Err(RenderError::Validation(_))));
}

#[test]
fn rejects_zero_threads_and_unloaded_store() {
    let docs = vec![solid_doc([0, 0, 0, 255], 10.0)];
    assert!(matches!(
        render_batch(store(), &docs, &RenderOpts::default(), Some(0)),
        Err(RenderError::Configuration(_))
    ));
    assert!(matches!(
        render_batch(Arc::new(FontStore::new()), &docs, &RenderOpts::default(), None),
        Err(RenderError::Configuration(_))
    ));
}
