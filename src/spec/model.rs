use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{FlowError, FlowResult};

/// Title used when the caller supplies none and generation failed.
pub const FALLBACK_TITLE: &str = "Untitled";

/// Structured description of a data-flow diagram and its animation frames.
///
/// Serialized with the same field names the completion service is asked to produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSpec {
    /// Diagram title.
    pub title: String,
    /// Positioned, labeled entities.
    pub nodes: Vec<Node>,
    /// Directed relationships between node ids.
    pub flows: Vec<Flow>,
    /// Animation states, played back in ascending `index` order.
    pub frames: Vec<Frame>,
}

/// Semantic type of a node. Unknown values deserialize to [`NodeKind::Other`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// End user, browser, or calling system.
    Client,
    /// Backend service.
    Service,
    /// Database or other durable store.
    Db,
    /// Queue, topic, or stream.
    Queue,
    /// Anything else.
    #[default]
    Other,
}

impl NodeKind {
    /// Total mapping from the wire string, case-insensitive.
    pub fn from_wire(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Self::Client,
            "service" => Self::Service,
            "db" => Self::Db,
            "queue" => Self::Queue,
            _ => Self::Other,
        }
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Str(String),
            Any(serde::de::IgnoredAny),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Str(s) => Self::from_wire(&s),
            Repr::Any(_) => Self::Other,
        })
    }
}

/// A labeled entity centered at `(x, y)` in canvas space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique id within the spec.
    pub id: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Semantic type; drives the default border style.
    #[serde(rename = "type", default)]
    pub kind: NodeKind,
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
}

/// Directed edge between two node ids. Endpoints are references, not copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    /// Source node id.
    pub from: String,
    /// Destination node id.
    pub to: String,
    /// Edge label.
    #[serde(default)]
    pub label: String,
}

/// `(from, to)` pair identifying a flow inside a frame's highlight list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowRef {
    /// Source node id.
    pub from: String,
    /// Destination node id.
    pub to: String,
}

impl FlowRef {
    /// Build a reference from two ids.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// One discrete visual state of the animation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    /// Playback position; lower plays first. Integral floats such as `1.0` are accepted.
    #[serde(deserialize_with = "integral_index")]
    pub index: i64,
    /// Node ids drawn in the highlighted style.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_nodes: Option<Vec<String>>,
    /// Flows drawn in the highlighted style, matched on `(from, to)` ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_flows: Option<Vec<FlowRef>>,
    /// Optional caption drawn near the bottom edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

fn integral_index<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(i64),
        Float(f64),
    }

    match Repr::deserialize(deserializer) {
        Ok(Repr::Int(i)) => Ok(i),
        Ok(Repr::Float(f)) if f.fract() == 0.0 && f.abs() < 9.0e15 => Ok(f as i64),
        Ok(Repr::Float(f)) => Err(serde::de::Error::custom(format!(
            "frame index must be an integer, got {f}"
        ))),
        Err(_) => Err(serde::de::Error::custom("frame index must be a number")),
    }
}

impl Frame {
    /// An unhighlighted, uncaptioned frame at `index`.
    pub fn plain(index: i64) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Return `true` when `id` is listed in `highlight_nodes`.
    pub fn highlights_node(&self, id: &str) -> bool {
        self.highlight_nodes
            .as_deref()
            .is_some_and(|ids| ids.iter().any(|n| n == id))
    }

    /// Return `true` when `(from, to)` is listed in `highlight_flows`. Labels never match.
    pub fn highlights_flow(&self, from: &str, to: &str) -> bool {
        self.highlight_flows
            .as_deref()
            .is_some_and(|refs| refs.iter().any(|r| r.from == from && r.to == to))
    }

    /// Caption text if present and not blank.
    pub fn visible_caption(&self) -> Option<&str> {
        self.caption.as_deref().filter(|c| !c.trim().is_empty())
    }
}

impl DiagramSpec {
    /// Empty but well-formed spec returned alongside failures.
    pub fn placeholder(title: Option<&str>) -> Self {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(FALLBACK_TITLE);
        Self {
            title: title.to_string(),
            nodes: Vec::new(),
            flows: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Stable ascending sort of `frames` by `index`.
    pub fn sort_frames(&mut self) {
        self.frames.sort_by_key(|f| f.index);
    }

    /// Frames in playback order.
    ///
    /// A spec without frames plays a single plain frame so the artifact is never empty.
    pub fn playback_frames(&self) -> Vec<Frame> {
        if self.frames.is_empty() {
            return vec![Frame::plain(0)];
        }
        let mut frames = self.frames.clone();
        frames.sort_by_key(|f| f.index);
        frames
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Parse a spec from JSON text and sort its frames.
    pub fn from_json_str(s: &str) -> FlowResult<Self> {
        let mut spec: Self =
            serde_json::from_str(s).map_err(|e| FlowError::schema(format!("diagram spec: {e}")))?;
        spec.sort_frames();
        Ok(spec)
    }

    /// Read and parse a spec JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> FlowResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read diagram spec '{}'", path.display()))?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/spec/model.rs"]
mod tests;
