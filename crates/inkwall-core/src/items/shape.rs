//! Rectangle and ellipse shapes.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

use super::{BoardItem, Item, ItemKind, SerializableColor};
use crate::config::WorldBounds;
use crate::geometry::{rect_contains, round_coord};
use crate::scene::{Collection, Scene};

/// Outline of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    #[default]
    Rect,
    Ellipse,
}

fn default_width() -> f64 {
    1.0
}

fn default_opacity() -> f64 {
    1.0
}

/// An axis-aligned rectangle or ellipse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(rename = "type", default)]
    pub shape_type: ShapeType,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Outline color
    pub stroke: SerializableColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<SerializableColor>,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Outline width
    #[serde(default = "default_width")]
    pub width: f64,
}

impl Shape {
    /// Shape spanned by a creation drag from `start` to `end`.
    ///
    /// The box is normalized to a top-left corner and each side is at
    /// least `min_size`.
    pub fn from_drag(shape_type: ShapeType, start: Point, end: Point, min_size: f64) -> Self {
        let dx = round_coord(end.x - start.x);
        let dy = round_coord(end.y - start.y);
        Self {
            shape_type,
            x: round_coord(start.x.min(end.x)),
            y: round_coord(start.y.min(end.y)),
            w: dx.abs().max(min_size),
            h: dy.abs().max(min_size),
            stroke: SerializableColor::black(),
            fill: None,
            opacity: 1.0,
            width: 1.0,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    pub fn contains(&self, point: Point) -> bool {
        rect_contains(self.rect(), point)
    }

    /// Width and height after a corner drag of `delta`.
    ///
    /// Each side is floored at `min_size` and may not push the far edge past
    /// the world maximum.
    pub fn resized(&self, delta: Vec2, min_size: f64, world: &WorldBounds) -> (f64, f64) {
        let size = world.resize_extent(Point::new(self.x, self.y), Size::new(self.w, self.h), delta, min_size);
        (size.width, size.height)
    }
}

impl BoardItem for Shape {
    const KIND: ItemKind = ItemKind::Shape;

    fn collection(scene: &Scene) -> &Collection<Self> {
        &scene.shapes
    }

    fn collection_mut(scene: &mut Scene) -> &mut Collection<Self> {
        &mut scene.shapes
    }

    fn from_item(item: &Item) -> Option<&Self> {
        match item {
            Item::Shape(s) => Some(s),
            _ => None,
        }
    }

    fn into_item(self) -> Item {
        Item::Shape(self)
    }

    fn translated(&self, delta: Vec2, world: &WorldBounds) -> Self {
        Self {
            x: world.clamp_x(round_coord(self.x + delta.x)),
            y: world.clamp_y(round_coord(self.y + delta.y)),
            ..self.clone()
        }
    }
}
