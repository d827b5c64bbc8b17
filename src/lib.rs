#![forbid(unsafe_code)]
//! `flowreel` turns technical article text into a looping animated data-flow diagram.
//!
//! The pipeline runs in four stages:
//! - [`SpecGenerator`] asks a completion service for a [`DiagramSpec`] and validates it.
//! - [`FrameRenderer`] rasterizes one frame of the spec on the CPU.
//! - [`AnimationEncoder`] accumulates frames into a looping GIF stream.
//! - [`PipelineOrchestrator`] sequences the stages and publishes the artifact per slug.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use flowreel::{
//!     ArticleRequest, LocalStore, OpenAiClient, PipelineConfig, PipelineOrchestrator,
//!     ServiceConfig, SpecGenerator,
//! };
//!
//! # fn main() -> flowreel::FlowResult<()> {
//! let service = ServiceConfig::from_env()?;
//! let generator = SpecGenerator::new(Arc::new(OpenAiClient::new(&service)))
//!     .with_retry(service.retry);
//! let orchestrator =
//!     PipelineOrchestrator::new(generator, Arc::new(LocalStore), PipelineConfig::default())?;
//!
//! let result = orchestrator.generate(&ArticleRequest::new("...article text...", "my-post"));
//! println!("{}", result.artifact_path);
//! # Ok(())
//! # }
//! ```

pub mod encode;
pub(crate) mod foundation;
pub mod pipeline;
pub mod render;
pub mod service;
pub mod spec;

pub use encode::gif::{AnimationEncoder, EncoderPhase};
pub use encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use foundation::core::{Canvas, Fps, Rgba8};
pub use foundation::error::{FlowError, FlowResult};
pub use pipeline::config::{PipelineConfig, normalize_slug};
pub use pipeline::orchestrator::{ArticleRequest, PipelineOrchestrator, PipelineResult};
pub use pipeline::store::{ArtifactStore, LocalStore};
pub use render::cpu::{FrameRenderer, RenderOpts, render_sequence};
pub use render::raster::FrameRGBA;
pub use render::style::Palette;
pub use service::config::ServiceConfig;
pub use service::openai::OpenAiClient;
pub use service::retry::RetryPolicy;
pub use service::{CompletionRequest, CompletionService};
pub use spec::generator::SpecGenerator;
pub use spec::model::{DiagramSpec, Flow, FlowRef, Frame, Node, NodeKind};
