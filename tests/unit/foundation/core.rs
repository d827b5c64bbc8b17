use super::*;

#[test]
fn canvas_rejects_zero_and_oversized() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert!(Canvas::new(70_000, 10).is_err());
    let c = Canvas::new(960, 540).unwrap();
    assert_eq!(c.rgba_len(), 960 * 540 * 4);
}

#[test]
fn fps_delay_is_integer_millis() {
    assert_eq!(Fps::new(6).unwrap().frame_delay_ms(), 166);
    assert_eq!(Fps::new(10).unwrap().frame_delay_ms(), 100);
    assert_eq!(Fps::new(5000).unwrap().frame_delay_ms(), 1);
    assert!(Fps::new(0).is_err());
}

#[test]
fn color_hex_literals_and_parsing_agree() {
    let c = Rgba8::from_hex(0x0f172a);
    assert_eq!(c, Rgba8::parse("#0f172a").unwrap());
    assert_eq!(c.to_array(), [0x0f, 0x17, 0x2a, 255]);
    assert_eq!(Rgba8::parse("22c55e80").unwrap().a, 0x80);
    assert!(Rgba8::parse("#12345").is_err());
    assert!(Rgba8::parse("#zzzzzz").is_err());
}
