use crate::foundation::error::{FlowError, FlowResult};
use crate::foundation::math::unpremultiply;

/// A rendered frame as RGBA8 pixels.
///
/// Frames produced by the renderer are **premultiplied alpha**; the flag makes this explicit at
/// API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Uniform frame filled with `rgba` (straight alpha).
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut data = vec![0u8; width as usize * height as usize * 4];
        for px in data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
            premultiplied: false,
        }
    }

    /// Straight-alpha pixel at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let px: [u8; 4] = self.data.get(i..i + 4)?.try_into().ok()?;
        Some(if self.premultiplied {
            unpremultiply(px)
        } else {
            px
        })
    }

    /// Convert into a straight-alpha `image` buffer (for PNG output).
    pub fn to_rgba_image(&self) -> FlowResult<image::RgbaImage> {
        let data = if self.premultiplied {
            let mut out = self.data.clone();
            for px in out.chunks_exact_mut(4) {
                let un = unpremultiply([px[0], px[1], px[2], px[3]]);
                px.copy_from_slice(&un);
            }
            out
        } else {
            self.data.clone()
        };
        image::RgbaImage::from_raw(self.width, self.height, data).ok_or_else(|| {
            FlowError::validation(format!(
                "frame buffer does not match {}x{} rgba8",
                self.width, self.height
            ))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
