use kurbo::{BezPath, PathEl, Point, RoundedRect, Shape, Stroke, StrokeOpts, Vec2};

use crate::render::style::{ARROW_HALF_ANGLE, ARROW_LEN, NODE_HEIGHT, NODE_RADIUS, NODE_WIDTH};

const TOLERANCE: f64 = 0.1;

/// Rounded node box centered on `center`.
pub(crate) fn node_shape(center: Point) -> RoundedRect {
    RoundedRect::new(
        center.x - NODE_WIDTH / 2.0,
        center.y - NODE_HEIGHT / 2.0,
        center.x + NODE_WIDTH / 2.0,
        center.y + NODE_HEIGHT / 2.0,
        NODE_RADIUS,
    )
}

pub(crate) fn node_path(center: Point) -> BezPath {
    node_shape(center).to_path(TOLERANCE)
}

/// Outline of `path` stroked with `width`, centered on the path.
pub(crate) fn outline(path: &BezPath, width: f64) -> BezPath {
    kurbo::stroke(
        path.iter(),
        &Stroke::new(width),
        &StrokeOpts::default(),
        TOLERANCE,
    )
}

/// Where an edge between two node centers leaves `from`'s box and enters `to`'s box.
///
/// Falls back to the raw centers when the boxes overlap, and returns `None` for coincident
/// centers (no direction to draw).
pub(crate) fn edge_endpoints(from: Point, to: Point) -> Option<(Point, Point)> {
    let delta = to - from;
    if delta.hypot() < f64::EPSILON {
        return None;
    }
    let t = box_exit_fraction(delta);
    if t >= 0.5 {
        return Some((from, to));
    }
    Some((from + delta * t, to - delta * t))
}

/// Fraction of `delta` at which a ray from a node center crosses its box border.
fn box_exit_fraction(delta: Vec2) -> f64 {
    let tx = if delta.x.abs() > f64::EPSILON {
        (NODE_WIDTH / 2.0) / delta.x.abs()
    } else {
        f64::INFINITY
    };
    let ty = if delta.y.abs() > f64::EPSILON {
        (NODE_HEIGHT / 2.0) / delta.y.abs()
    } else {
        f64::INFINITY
    };
    tx.min(ty)
}

/// Straight shaft from `start` to the base of the arrowhead at `tip`.
pub(crate) fn arrow_shaft(start: Point, tip: Point, width: f64) -> BezPath {
    let delta = tip - start;
    let len = delta.hypot();
    let mut path = BezPath::new();
    if len < f64::EPSILON {
        return path;
    }
    let dir = delta / len;
    let head_depth = (ARROW_LEN * ARROW_HALF_ANGLE.cos()).min(len);
    let end = tip - dir * head_depth;
    let n = Vec2::new(-dir.y, dir.x) * (width / 2.0);

    path.move_to(start + n);
    path.line_to(end + n);
    path.line_to(end - n);
    path.line_to(start - n);
    path.close_path();
    path
}

/// Filled triangular arrowhead with its point at `tip`, oriented along `start -> tip`.
pub(crate) fn arrow_head(start: Point, tip: Point) -> BezPath {
    let angle = (tip.y - start.y).atan2(tip.x - start.x);
    let left = Point::new(
        tip.x - ARROW_LEN * (angle - ARROW_HALF_ANGLE).cos(),
        tip.y - ARROW_LEN * (angle - ARROW_HALF_ANGLE).sin(),
    );
    let right = Point::new(
        tip.x - ARROW_LEN * (angle + ARROW_HALF_ANGLE).cos(),
        tip.y - ARROW_LEN * (angle + ARROW_HALF_ANGLE).sin(),
    );

    let mut path = BezPath::new();
    path.move_to(tip);
    path.line_to(left);
    path.line_to(right);
    path.close_path();
    path
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/geometry.rs"]
mod tests;
