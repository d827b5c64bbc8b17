use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::foundation::error::{FlowError, FlowResult};
use crate::service::retry::RetryPolicy;
use crate::service::{CompletionRequest, CompletionService};
use crate::spec::model::DiagramSpec;

/// Upper bound on nodes accepted from the service.
pub const MAX_NODES: usize = 10;
/// Upper bound on frames accepted from the service.
pub const MAX_FRAMES: usize = 12;

const SYSTEM_PROMPT: &str = "You output valid minified JSON only. \
Analyze technical blog posts and extract data flow diagrams.";

const INSTRUCTIONS: &str = r#"You are a senior backend architect.

Input is a technical blog post.
1. Identify main components (services, db, queues, clients).
2. Identify data flow between them.
3. Return STRICT JSON with:
{
  "title": string,
  "nodes": [
    { "id": string, "label": string, "type": "client|service|db|queue|other", "x": number, "y": number }
  ],
  "flows": [
    { "from": string, "to": string, "label": string }
  ],
  "frames": [
    {
      "index": number,
      "highlightNodes": [string],
      "highlightFlows": [ { "from": string, "to": string } ],
      "caption": string
    }
  ]
}
Coordinates in range x:[100,900], y:[100,500].
Max 10 nodes, max 12 frames.
Now analyze and respond with JSON only."#;

const TEMPERATURE: f32 = 0.3;

/// Turns article text into a validated [`DiagramSpec`] with one completion call per attempt.
#[derive(Clone)]
pub struct SpecGenerator {
    service: Arc<dyn CompletionService>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for SpecGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecGenerator")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl SpecGenerator {
    /// Single-attempt generator over `service`.
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self {
            service,
            retry: RetryPolicy::none(),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build the request sent for `article`.
    pub fn request_for(article: &str) -> CompletionRequest {
        CompletionRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: format!("{INSTRUCTIONS}\n\nARTICLE:\n{article}"),
            temperature: TEMPERATURE,
            json_only: true,
        }
    }

    /// Generate a spec for `article`.
    ///
    /// Frames come back sorted by `index`. Parse and schema failures are not retried.
    #[tracing::instrument(skip(self, article), fields(article_len = article.len()))]
    pub fn generate(&self, article: &str) -> FlowResult<DiagramSpec> {
        if article.trim().is_empty() {
            return Err(FlowError::validation("article text must not be empty"));
        }

        let req = Self::request_for(article);
        let raw = self.retry.run(|attempt| {
            tracing::debug!(attempt, "requesting diagram spec");
            self.service.complete(&req)
        })?;

        let spec = parse_spec(&raw)?;
        tracing::debug!(
            nodes = spec.nodes.len(),
            flows = spec.flows.len(),
            frames = spec.frames.len(),
            "diagram spec accepted"
        );
        Ok(spec)
    }
}

/// Validate raw completion text and normalize it into a [`DiagramSpec`].
pub fn parse_spec(raw: &str) -> FlowResult<DiagramSpec> {
    let root: Value = serde_json::from_str(raw.trim())
        .map_err(|e| FlowError::parse(format!("completion is not valid JSON: {e}")))?;

    check_shape(&root)?;

    let mut spec: DiagramSpec = serde_json::from_value(root)
        .map_err(|e| FlowError::schema(format!("invalid diagram spec structure: {e}")))?;

    let mut seen = HashSet::with_capacity(spec.nodes.len());
    for node in &spec.nodes {
        if !seen.insert(node.id.as_str()) {
            return Err(FlowError::schema(format!(
                "duplicate node id '{}'",
                node.id
            )));
        }
    }
    if spec.nodes.len() > MAX_NODES {
        return Err(FlowError::schema(format!(
            "too many nodes: {} (max {MAX_NODES})",
            spec.nodes.len()
        )));
    }
    if spec.frames.len() > MAX_FRAMES {
        return Err(FlowError::schema(format!(
            "too many frames: {} (max {MAX_FRAMES})",
            spec.frames.len()
        )));
    }

    spec.sort_frames();
    Ok(spec)
}

fn check_shape(root: &Value) -> FlowResult<()> {
    let Some(obj) = root.as_object() else {
        return Err(FlowError::schema("diagram spec must be a JSON object"));
    };

    let title_ok = obj
        .get("title")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.trim().is_empty());
    if !title_ok {
        return Err(FlowError::schema("diagram spec is missing a non-empty title"));
    }

    for key in ["nodes", "flows", "frames"] {
        if !obj.get(key).is_some_and(Value::is_array) {
            return Err(FlowError::schema(format!(
                "diagram spec field '{key}' must be an array"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/spec/generator.rs"]
mod tests;
