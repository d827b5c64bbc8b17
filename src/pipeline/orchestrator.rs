use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError};

use serde::{Deserialize, Serialize};

use crate::encode::gif::AnimationEncoder;
use crate::foundation::error::{FlowError, FlowResult};
use crate::pipeline::config::{PipelineConfig, normalize_slug};
use crate::pipeline::locks::SlugLocks;
use crate::pipeline::store::ArtifactStore;
use crate::render::cpu::{FrameRenderer, render_sequence};
use crate::spec::generator::SpecGenerator;
use crate::spec::model::DiagramSpec;

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// One pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRequest {
    /// Article body. Must not be blank.
    pub text: String,
    /// Output namespace under every destination root.
    pub slug: String,
    /// Title used for the placeholder spec when the pipeline fails.
    #[serde(default)]
    pub title: Option<String>,
}

impl ArticleRequest {
    pub fn new(text: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            slug: slug.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Reject blank text and return the normalized slug.
    pub fn validate(&self) -> FlowResult<String> {
        if self.text.trim().is_empty() {
            return Err(FlowError::validation("article text must not be empty"));
        }
        normalize_slug(&self.slug)
    }
}

/// Outcome of [`PipelineOrchestrator::generate`]. Failures are data, never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub success: bool,
    /// Public path of the artifact, empty on failure.
    pub artifact_path: String,
    /// Generated spec, or an empty placeholder on failure.
    pub spec: DiagramSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PipelineResult {
    fn published(artifact_path: String, spec: DiagramSpec) -> Self {
        Self {
            success: true,
            artifact_path,
            spec,
            error: None,
        }
    }

    /// Failure result for `err`, carrying the placeholder spec titled `title`.
    pub fn failed(title: Option<&str>, err: &FlowError) -> Self {
        Self {
            success: false,
            artifact_path: String::new(),
            spec: DiagramSpec::placeholder(title),
            error: Some(err.to_string()),
        }
    }
}

/// Sequences generation, rendering, encoding and publication for one article at a time.
///
/// Safe to share across threads. Requests for the same slug are serialized.
pub struct PipelineOrchestrator {
    generator: SpecGenerator,
    store: Arc<dyn ArtifactStore>,
    config: PipelineConfig,
    locks: SlugLocks,
}

impl std::fmt::Debug for PipelineOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOrchestrator")
            .field("generator", &self.generator)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl PipelineOrchestrator {
    pub fn new(
        generator: SpecGenerator,
        store: Arc<dyn ArtifactStore>,
        config: PipelineConfig,
    ) -> FlowResult<Self> {
        config.validate()?;
        Ok(Self {
            generator,
            store,
            config,
            locks: SlugLocks::default(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the whole pipeline for `req`.
    ///
    /// On success the artifact exists at every destination. On failure the result carries a
    /// placeholder spec and no destination ever holds a partially written file.
    #[tracing::instrument(skip(self, req), fields(slug = %req.slug))]
    pub fn generate(&self, req: &ArticleRequest) -> PipelineResult {
        match self.run(req) {
            Ok((artifact_path, spec)) => PipelineResult::published(artifact_path, spec),
            Err(e) => {
                tracing::warn!(error = %e, "pipeline failed");
                PipelineResult::failed(req.title.as_deref(), &e)
            }
        }
    }

    fn run(&self, req: &ArticleRequest) -> FlowResult<(String, DiagramSpec)> {
        let slug = req.validate()?;

        let lock = self.locks.lock_for(&slug);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let spec = self.generator.generate(&req.text)?;

        self.store.ensure_dir(&self.config.staging_dir)?;
        let staging = self.staging_path(&slug);
        let published = self.encode_and_publish(&slug, &spec, &staging);
        if let Err(e) = self.store.remove_file(&staging) {
            tracing::warn!(path = %staging.display(), error = %e, "failed to remove staging file");
        }

        Ok((published?, spec))
    }

    fn staging_path(&self, slug: &str) -> PathBuf {
        let seq = STAGING_SEQ.fetch_add(1, Ordering::Relaxed);
        self.config.staging_dir.join(format!(
            ".{slug}-{}-{seq}.{}.partial",
            std::process::id(),
            self.config.artifact_filename
        ))
    }

    fn encode_and_publish(
        &self,
        slug: &str,
        spec: &DiagramSpec,
        staging: &Path,
    ) -> FlowResult<String> {
        let mut renderer = FrameRenderer::new(self.config.render.clone())?;
        let mut encoder = AnimationEncoder::new(self.store.create(staging)?)
            .with_matte(self.config.render.palette.background.to_array());
        let frames = render_sequence(
            &mut renderer,
            spec,
            &mut encoder,
            self.config.sink_config(),
        )?;
        drop(encoder.into_inner()?);

        let bytes = self.store.read(staging)?;
        for path in self.config.destination_paths(slug) {
            if let Some(parent) = path.parent() {
                self.store.ensure_dir(parent)?;
            }
            self.store.write_bytes(&path, &bytes)?;
            tracing::info!(path = %path.display(), frames, bytes = bytes.len(), "published artifact");
        }
        Ok(self.config.artifact_path(slug))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/orchestrator.rs"]
mod tests;
