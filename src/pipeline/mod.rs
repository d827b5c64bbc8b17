//! End-to-end pipeline: article text in, published looping GIF out.
//!
//! [`orchestrator::PipelineOrchestrator`] is the only place that catches errors; everything it
//! returns is data.

pub mod config;
pub(crate) mod locks;
pub mod orchestrator;
pub mod store;
