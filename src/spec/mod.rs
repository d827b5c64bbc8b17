//! Diagram specification model and its generation from article text.

/// Spec generation through a completion service.
pub mod generator;
/// Boundary data model (`DiagramSpec` and friends).
pub mod model;
