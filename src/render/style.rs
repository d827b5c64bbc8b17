use crate::foundation::core::Rgba8;
use crate::spec::model::NodeKind;

/// Node box width in pixels.
pub const NODE_WIDTH: f64 = 140.0;
/// Node box height in pixels.
pub const NODE_HEIGHT: f64 = 60.0;
/// Node corner radius in pixels.
pub const NODE_RADIUS: f64 = 8.0;
/// Arrowhead side length in pixels.
pub const ARROW_LEN: f64 = 12.0;
/// Arrowhead half-angle in radians (30°).
pub const ARROW_HALF_ANGLE: f64 = std::f64::consts::PI / 6.0;
/// Distance from the bottom edge to the caption's baseline box bottom.
pub const CAPTION_BOTTOM_MARGIN: f64 = 20.0;
/// Node label font size.
pub const LABEL_SIZE_PX: f32 = 14.0;
/// Caption font size.
pub const CAPTION_SIZE_PX: f32 = 18.0;

/// Fill, border and line width for one drawn element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
    pub fill: Rgba8,
    pub border: Rgba8,
    pub border_width: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStyle {
    pub color: Rgba8,
    pub width: f64,
}

/// Dark slate palette used for every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    pub background: Rgba8,
    pub node_fill: Rgba8,
    pub node_fill_highlight: Rgba8,
    pub node_border_highlight: Rgba8,
    pub edge: Rgba8,
    pub edge_highlight: Rgba8,
    pub text: Rgba8,
    pub caption: Rgba8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgba8::from_hex(0x0f172a),
            node_fill: Rgba8::from_hex(0x111827),
            node_fill_highlight: Rgba8::from_hex(0x22c55e),
            node_border_highlight: Rgba8::from_hex(0x22c55e),
            edge: Rgba8::from_hex(0x64748b),
            edge_highlight: Rgba8::from_hex(0x38bdf8),
            text: Rgba8::from_hex(0xe5e7eb),
            caption: Rgba8::from_hex(0xe5e7eb),
        }
    }
}

impl Palette {
    /// Default border color per node kind. `Other` keeps the neutral slate.
    pub fn kind_border(&self, kind: NodeKind) -> Rgba8 {
        match kind {
            NodeKind::Client => Rgba8::from_hex(0xa5b4fc),
            NodeKind::Service => Rgba8::from_hex(0x7dd3fc),
            NodeKind::Db => Rgba8::from_hex(0xfcd34d),
            NodeKind::Queue => Rgba8::from_hex(0xf9a8d4),
            NodeKind::Other => Rgba8::from_hex(0x94a3b8),
        }
    }

    pub fn node(&self, kind: NodeKind, highlighted: bool) -> NodeStyle {
        if highlighted {
            NodeStyle {
                fill: self.node_fill_highlight,
                border: self.node_border_highlight,
                border_width: 3.0,
            }
        } else {
            NodeStyle {
                fill: self.node_fill,
                border: self.kind_border(kind),
                border_width: 1.5,
            }
        }
    }

    pub fn edge(&self, highlighted: bool) -> EdgeStyle {
        if highlighted {
            EdgeStyle {
                color: self.edge_highlight,
                width: 4.0,
            }
        } else {
            EdgeStyle {
                color: self.edge,
                width: 2.0,
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/style.rs"]
mod tests;
