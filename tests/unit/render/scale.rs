use proptest::prelude::*;

use super::*;

#[test]
fn landscape_canvas_fits_long_edge() {
    let fit = fit_scale(1000.0, 500.0, Some(360)).unwrap();
    assert_eq!((fit.sx, fit.sy), (0.36, 0.36));
    assert_eq!((fit.width, fit.height), (360, 180));
}

#[test]
fn small_canvas_is_not_upscaled() {
    let fit = fit_scale(200.0, 100.0, Some(360)).unwrap();
    assert_eq!((fit.sx, fit.sy), (1.0, 1.0));
    assert_eq!((fit.width, fit.height), (200, 100));

    let fit = fit_scale(1080.0, 1920.0, None).unwrap();
    assert_eq!((fit.width, fit.height), (1080, 1920));
}

#[test]
fn degenerate_axis_is_forced_to_one_pixel() {
    let fit = fit_scale(0.5, 0.5, Some(360)).unwrap();
    assert_eq!((fit.width, fit.height), (1, 1));
    assert_eq!((fit.sx, fit.sy), (2.0, 2.0));

    let fit = fit_scale(10_000.0, 1.0, Some(360)).unwrap();
    assert_eq!((fit.width, fit.height), (360, 1));
    assert_eq!(fit.sx, 0.036);
    assert_eq!(fit.sy, 1.0);
}

#[test]
fn halves_round_to_even() {
    // 5 * 0.5 = 2.5 rounds to 2.
    let fit = fit_scale(10.0, 5.0, Some(5)).unwrap();
    assert_eq!((fit.width, fit.height), (5, 2));
}

#[test]
fn invalid_canvas_is_a_sizing_error() {
    for (w, h) in [(0.0, 10.0), (10.0, -1.0), (f64::NAN, 1.0), (f64::INFINITY, 1.0)] {
        assert!(matches!(
            fit_scale(w, h, Some(360)),
            Err(RenderError::Sizing(_))
        ));
    }
}

proptest! {
    #[test]
    fn fitted_size_is_positive_and_bounded(
        w in 0.01f64..20_000.0,
        h in 0.01f64..20_000.0,
        max in 1u32..2048,
    ) {
        let fit = fit_scale(w, h, Some(max)).unwrap();
        prop_assert!(fit.width >= 1 && fit.height >= 1);
        prop_assert!(fit.width <= max.max(1) + 1);
        prop_assert!(fit.height <= max.max(1) + 1);
    }
}
