use std::path::{Component, Path, PathBuf};

use crate::encode::sink::SinkConfig;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{FlowError, FlowResult};
use crate::render::cpu::RenderOpts;

/// File name of the published artifact inside each slug directory.
pub const DEFAULT_ARTIFACT_FILENAME: &str = "flow.gif";
/// URL prefix reported back to callers.
pub const DEFAULT_ASSETS_PREFIX: &str = "/assets/images";

/// Persistence and playback settings for [`super::orchestrator::PipelineOrchestrator`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Roots that receive `<root>/<slug>/<artifact_filename>`.
    pub destinations: Vec<PathBuf>,
    /// Directory holding private staging files while encoding.
    pub staging_dir: PathBuf,
    pub artifact_filename: String,
    pub assets_prefix: String,
    pub fps: Fps,
    /// `0` loops forever.
    pub loop_count: u16,
    pub render: RenderOpts,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            destinations: vec![
                PathBuf::from("assets/images"),
                PathBuf::from("public/assets/images"),
            ],
            staging_dir: PathBuf::from("."),
            artifact_filename: DEFAULT_ARTIFACT_FILENAME.to_string(),
            assets_prefix: DEFAULT_ASSETS_PREFIX.to_string(),
            fps: Fps(6),
            loop_count: 0,
            render: RenderOpts::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> FlowResult<()> {
        if self.destinations.is_empty() {
            return Err(FlowError::config("at least one destination root is required"));
        }
        if !is_single_segment(&self.artifact_filename) {
            return Err(FlowError::config(format!(
                "artifact filename '{}' must be a plain file name",
                self.artifact_filename
            )));
        }
        Fps::new(self.fps.0).map_err(|e| FlowError::config(e.to_string()))?;
        Canvas::new(self.render.canvas.width, self.render.canvas.height)
            .map_err(|e| FlowError::config(e.to_string()))?;
        Ok(())
    }

    /// Encoder settings derived from the canvas, fps and loop count.
    pub fn sink_config(&self) -> SinkConfig {
        SinkConfig {
            width: self.render.canvas.width,
            height: self.render.canvas.height,
            loop_count: self.loop_count,
            frame_delay_ms: self.fps.frame_delay_ms(),
        }
    }

    /// Every durable path the artifact for `slug` is written to.
    pub fn destination_paths(&self, slug: &str) -> Vec<PathBuf> {
        self.destinations
            .iter()
            .map(|root| root.join(slug).join(&self.artifact_filename))
            .collect()
    }

    /// Path reported to callers, e.g. `/assets/images/<slug>/flow.gif`.
    pub fn artifact_path(&self, slug: &str) -> String {
        format!(
            "{}/{slug}/{}",
            self.assets_prefix.trim_end_matches('/'),
            self.artifact_filename
        )
    }
}

/// Trim and validate a caller-supplied slug.
///
/// A slug is one path segment: no separators, no `.`/`..`, never absolute. This keeps every
/// destination under its root.
pub fn normalize_slug(raw: &str) -> FlowResult<String> {
    let slug = raw.trim();
    if slug.is_empty() {
        return Err(FlowError::validation("slug must not be empty"));
    }
    if slug.contains(['/', '\\']) {
        return Err(FlowError::validation(format!(
            "slug '{slug}' must not contain path separators"
        )));
    }
    if slug.contains("..") {
        return Err(FlowError::validation(format!(
            "slug '{slug}' must not contain '..'"
        )));
    }
    if !is_single_segment(slug) {
        return Err(FlowError::validation(format!(
            "slug '{slug}' must be a single relative path segment"
        )));
    }
    Ok(slug.to_string())
}

fn is_single_segment(s: &str) -> bool {
    let mut components = Path::new(s).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/config.rs"]
mod tests;
