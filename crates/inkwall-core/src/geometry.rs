//! Geometry helpers shared by hit testing, freehand capture and dragging.

use kurbo::{Point, Rect, Vec2};

/// Clamp `value` into `[min, max]`.
///
/// Unlike `f64::clamp` this never panics: when `min > max` the upper bound
/// wins, which is what the drag rules expect near the world edge.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Round to the nearest integer, halves toward positive infinity.
///
/// Every client must snap coordinates the same way, so negative deltas
/// round like positive ones (`-2.5` becomes `-2`).
pub fn round_coord(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Distance from a point to the segment `a`-`b`.
///
/// Degenerate segments fall back to the distance to `a`.
pub fn distance_to_segment(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = clamp(pv.dot(seg) / len_sq, 0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Perpendicular distance from `point` to the infinite line through `a` and `b`.
pub fn perpendicular_distance(point: Point, a: Point, b: Point) -> f64 {
    let d = b - a;
    let len = d.hypot();
    if len < f64::EPSILON {
        // Line is a point
        return (point - a).hypot();
    }
    // Area of triangle * 2 / base = height
    ((point - a).cross(d)).abs() / len
}

/// Inclusive containment: points on the rectangle edge count as inside.
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Whether `point` is within `tolerance` of the bottom-right corner of `rect`.
pub fn near_corner(rect: Rect, point: Point, tolerance: f64) -> bool {
    (point - Point::new(rect.x1, rect.y1)).hypot() <= tolerance
}

/// Snap each point to a grid of `step` world units.
pub fn quantize(points: &[Point], step: f64) -> Vec<Point> {
    if step <= 0.0 {
        return points.to_vec();
    }
    points
        .iter()
        .map(|p| Point::new(round_coord(p.x / step) * step, round_coord(p.y / step) * step))
        .collect()
}

/// Greedy single-pass polyline simplification.
///
/// Keeps the first and last points. An interior point is kept when its
/// distance to the line from the last kept point to its successor exceeds
/// `epsilon`. Runs in linear time.
pub fn simplify(points: &[Point], epsilon: f64) -> Vec<Point> {
    if points.len() <= 2 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len());
    out.push(points[0]);
    let mut last = points[0];
    for window in points[1..].windows(2) {
        let (p, next) = (window[0], window[1]);
        if perpendicular_distance(p, last, next) > epsilon {
            out.push(p);
            last = p;
        }
    }
    out.push(points[points.len() - 1]);
    out
}

/// Convert to integer wire coordinates, truncating toward zero.
pub fn to_wire(points: &[Point]) -> Vec<[i32; 2]> {
    points.iter().map(|p| [p.x as i32, p.y as i32]).collect()
}

/// Bounding box of a point set, or `None` when empty.
pub fn bounding_box(points: impl IntoIterator<Item = Point>) -> Option<Rect> {
    let mut iter = points.into_iter();
    let first = iter.next()?;
    Some(iter.fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p)))
}

/// Delta between two world points, rounded per axis.
pub fn rounded_delta(from: Point, to: Point) -> Vec2 {
    let d = to - from;
    Vec2::new(round_coord(d.x), round_coord(d.y))
}
