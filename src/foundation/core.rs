use crate::foundation::error::{FlowError, FlowResult};

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas. Both sides must fit the rasterizer's `u16` surface.
    pub fn new(width: u32, height: u32) -> FlowResult<Self> {
        if width == 0 || height == 0 {
            return Err(FlowError::validation("canvas width/height must be non-zero"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(FlowError::validation(format!(
                "canvas {width}x{height} exceeds {max}x{max}",
                max = u16::MAX
            )));
        }
        Ok(Self { width, height })
    }

    /// Number of bytes in a tightly packed RGBA8 buffer of this size.
    pub fn rgba_len(self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 960,
            height: 540,
        }
    }
}

/// Playback rate in whole frames per second.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps(pub u32);

impl Fps {
    /// Create a validated FPS value.
    pub fn new(fps: u32) -> FlowResult<Self> {
        if fps == 0 {
            return Err(FlowError::validation("fps must be > 0"));
        }
        Ok(Self(fps))
    }

    /// Display time of one frame in whole milliseconds, never below 1.
    pub fn frame_delay_ms(self) -> u32 {
        (1000 / self.0.max(1)).max(1)
    }
}

impl Default for Fps {
    fn default() -> Self {
        Self(6)
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from a `0xRRGGBB` literal.
    pub const fn from_hex(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xff) as u8,
            g: ((rgb >> 8) & 0xff) as u8,
            b: (rgb & 0xff) as u8,
            a: 255,
        }
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn parse(s: &str) -> FlowResult<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        let byte = |i: usize| {
            hex.get(i..i + 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| FlowError::validation(format!("invalid color '{s}'")))
        };
        match hex.len() {
            6 => Ok(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: 255,
            }),
            8 => Ok(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => Err(FlowError::validation(format!("invalid color '{s}'"))),
        }
    }

    /// Channels as `[r, g, b, a]`.
    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
