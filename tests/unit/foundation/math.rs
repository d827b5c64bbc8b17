use super::*;

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(255, 128), 128);
    assert_eq!(mul_div255_u16(0, 200), 0);
}

#[test]
fn unpremultiply_handles_extremes() {
    assert_eq!(unpremultiply([10, 20, 30, 255]), [10, 20, 30, 255]);
    assert_eq!(unpremultiply([10, 20, 30, 0]), [0, 0, 0, 0]);
    assert_eq!(unpremultiply([64, 0, 0, 128]), [128, 0, 0, 128]);
}
