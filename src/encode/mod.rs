//! Encoding sinks.
//!
//! Sinks consume rendered frames in playback order.

/// Looping GIF accumulator.
pub mod gif;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
