//! CPU rasterization of diagram frames.

/// Frame renderer and sequence driver.
pub mod cpu;
pub(crate) mod geometry;
/// Rendered frame buffers.
pub mod raster;
/// Palette and fixed drawing metrics.
pub mod style;
pub(crate) mod text;
