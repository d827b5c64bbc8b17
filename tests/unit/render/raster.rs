use super::*;

#[test]
fn pixel_reads_are_bounds_checked() {
    let f = FrameRGBA::solid(4, 2, [1, 2, 3, 255]);
    assert_eq!(f.pixel(3, 1), Some([1, 2, 3, 255]));
    assert_eq!(f.pixel(4, 0), None);
    assert_eq!(f.pixel(0, 2), None);
}

#[test]
fn premultiplied_pixels_are_unpremultiplied_on_read() {
    let f = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![64, 0, 0, 128],
        premultiplied: true,
    };
    assert_eq!(f.pixel(0, 0), Some([128, 0, 0, 128]));
    let img = f.to_rgba_image().unwrap();
    assert_eq!(img.get_pixel(0, 0).0, [128, 0, 0, 128]);
}

#[test]
fn mismatched_buffer_is_rejected() {
    let f = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 3],
        premultiplied: false,
    };
    assert!(f.to_rgba_image().is_err());
}
