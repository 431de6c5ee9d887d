//! Freehand strokes.

use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::{BoardItem, Item, ItemKind, SerializableColor};
use crate::config::WorldBounds;
use crate::geometry::{self, bounding_box, distance_to_segment};
use crate::scene::{Collection, Scene};

/// How a stroke composites onto what is below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Normal,
    /// Used by the highlighter.
    Multiply,
}

fn default_width() -> f64 {
    1.0
}

fn default_opacity() -> f64 {
    1.0
}

/// A freehand stroke: a polyline of integer world points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: SerializableColor,
    #[serde(default = "default_width")]
    pub width: f64,
    pub points: Vec<[i32; 2]>,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub mode: BlendMode,
}

impl Stroke {
    /// Build a stroke from a captured path.
    ///
    /// The path is snapped to the quantize grid, simplified, then truncated
    /// to integer wire points. Returns `None` when fewer than two points
    /// were captured.
    pub fn from_path(
        path: &[Point],
        quantize_step: f64,
        epsilon: f64,
        color: SerializableColor,
        width: f64,
        opacity: f64,
        mode: BlendMode,
    ) -> Option<Self> {
        if path.len() < 2 {
            return None;
        }
        let points = geometry::to_wire(&geometry::simplify(
            &geometry::quantize(path, quantize_step),
            epsilon,
        ));
        Some(Self {
            color,
            width,
            points,
            opacity,
            mode,
        })
    }

    /// Points as world coordinates.
    pub fn world_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.points
            .iter()
            .map(|[x, y]| Point::new(*x as f64, *y as f64))
    }

    /// Whether `point` lies within `tolerance` of any segment.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.points.windows(2).any(|w| {
            let a = Point::new(w[0][0] as f64, w[0][1] as f64);
            let b = Point::new(w[1][0] as f64, w[1][1] as f64);
            distance_to_segment(point, a, b) <= tolerance
        })
    }

    pub fn bounds(&self) -> Rect {
        bounding_box(self.world_points()).unwrap_or(Rect::ZERO)
    }

    /// Shrink an integer delta so every moved point stays inside the world.
    pub fn clamp_delta(&self, dx: i32, dy: i32, world: &WorldBounds) -> (i32, i32) {
        let bounds = self.bounds();
        let fit = |d: i32, lo: f64, hi: f64, min: f64, max: f64| -> i32 {
            let d = d as f64;
            let d = if lo + d < min { min - lo } else { d };
            let d = if hi + d > max { max - hi } else { d };
            d as i32
        };
        (
            fit(dx, bounds.x0, bounds.x1, world.min_x, world.max_x),
            fit(dy, bounds.y0, bounds.y1, world.min_y, world.max_y),
        )
    }

    /// Points shifted by an integer delta, clamped to stay in-world.
    pub fn shifted_points(&self, dx: i32, dy: i32, world: &WorldBounds) -> Vec<[i32; 2]> {
        let (dx, dy) = self.clamp_delta(dx, dy, world);
        self.points.iter().map(|[x, y]| [x + dx, y + dy]).collect()
    }

    /// Polyline path, for renderers.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        let mut points = self.world_points();
        if let Some(first) = points.next() {
            path.move_to(first);
            for p in points {
                path.line_to(p);
            }
        }
        path
    }
}

impl BoardItem for Stroke {
    const KIND: ItemKind = ItemKind::Stroke;

    fn collection(scene: &Scene) -> &Collection<Self> {
        &scene.strokes
    }

    fn collection_mut(scene: &mut Scene) -> &mut Collection<Self> {
        &mut scene.strokes
    }

    fn from_item(item: &Item) -> Option<&Self> {
        match item {
            Item::Stroke(s) => Some(s),
            _ => None,
        }
    }

    fn into_item(self) -> Item {
        Item::Stroke(self)
    }

    fn translated(&self, delta: Vec2, world: &WorldBounds) -> Self {
        Self {
            points: self.shifted_points(delta.x as i32, delta.y as i32, world),
            ..self.clone()
        }
    }
}
