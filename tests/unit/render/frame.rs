use super::*;

fn frame(data: Vec<u8>, premultiplied: bool) -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 1,
        data,
        premultiplied,
    }
}

#[test]
fn pixel_reads_straight_alpha() {
    let f = frame(vec![64, 0, 0, 128, 10, 20, 30, 255], true);
    assert_eq!(f.pixel(0, 0), Some([128, 0, 0, 128]));
    assert_eq!(f.pixel(1, 0), Some([10, 20, 30, 255]));
    assert_eq!(f.pixel(2, 0), None);
    assert_eq!(f.pixel(0, 1), None);
}

#[test]
fn into_straight_clears_flag_and_zeroes_transparent() {
    let f = frame(vec![5, 5, 5, 0, 100, 100, 100, 255], true).into_straight();
    assert!(!f.premultiplied);
    assert_eq!(&f.data[..4], &[0, 0, 0, 0]);
    assert_eq!(&f.data[4..], &[100, 100, 100, 255]);

    let straight = frame(vec![1, 2, 3, 4, 5, 6, 7, 8], false);
    assert_eq!(straight.clone().into_straight(), straight);
}
