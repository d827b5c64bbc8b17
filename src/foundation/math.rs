pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

/// Undo premultiplication of one RGBA8 pixel.
pub(crate) fn unpremultiply(px: [u8; 4]) -> [u8; 4] {
    let a = px[3];
    match a {
        0 => [0, 0, 0, 0],
        255 => px,
        _ => {
            let a16 = u32::from(a);
            let un = |c: u8| -> u8 { ((u32::from(c) * 255 + a16 / 2) / a16).min(255) as u8 };
            [un(px[0]), un(px[1]), un(px[2]), a]
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
