//! Line and arrow connectors.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use super::{BoardItem, Item, ItemKind, SerializableColor};
use crate::config::WorldBounds;
use crate::geometry::{distance_to_segment, round_coord};
use crate::scene::{Collection, Scene};

/// One end of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    A,
    B,
}

fn default_width() -> f64 {
    2.0
}

fn default_opacity() -> f64 {
    1.0
}

/// A straight connector from A to B, optionally with an arrowhead at B.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub ax: f64,
    pub ay: f64,
    pub bx: f64,
    pub by: f64,
    #[serde(default)]
    pub arrow: bool,
    pub stroke: SerializableColor,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

impl Connector {
    /// Connector between two rounded points.
    pub fn between(a: Point, b: Point, arrow: bool) -> Self {
        Self {
            ax: round_coord(a.x),
            ay: round_coord(a.y),
            bx: round_coord(b.x),
            by: round_coord(b.y),
            arrow,
            stroke: SerializableColor::black(),
            width: default_width(),
            opacity: 1.0,
        }
    }

    pub fn a(&self) -> Point {
        Point::new(self.ax, self.ay)
    }

    pub fn b(&self) -> Point {
        Point::new(self.bx, self.by)
    }

    pub fn length(&self) -> f64 {
        (self.b() - self.a()).hypot()
    }

    /// Distance from `point` to the connector body.
    pub fn distance(&self, point: Point) -> f64 {
        distance_to_segment(point, self.a(), self.b())
    }

    /// Endpoint strictly within `tolerance` of `point`.
    ///
    /// When both ends qualify the nearer one wins, A on a tie.
    pub fn endpoint_near(&self, point: Point, tolerance: f64) -> Option<Endpoint> {
        let da = (point - self.a()).hypot();
        let db = (point - self.b()).hypot();
        match (da < tolerance, db < tolerance) {
            (true, true) if db < da => Some(Endpoint::B),
            (true, _) => Some(Endpoint::A),
            (false, true) => Some(Endpoint::B),
            (false, false) => None,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_points(self.a(), self.b())
    }

    /// Copy with one endpoint placed at `point`, clamped to the world.
    pub fn with_endpoint(&self, end: Endpoint, point: Point, world: &WorldBounds) -> Self {
        let x = world.clamp_x(round_coord(point.x));
        let y = world.clamp_y(round_coord(point.y));
        let mut out = self.clone();
        match end {
            Endpoint::A => {
                out.ax = x;
                out.ay = y;
            }
            Endpoint::B => {
                out.bx = x;
                out.by = y;
            }
        }
        out
    }
}

impl BoardItem for Connector {
    const KIND: ItemKind = ItemKind::Connector;

    fn collection(scene: &Scene) -> &Collection<Self> {
        &scene.connectors
    }

    fn collection_mut(scene: &mut Scene) -> &mut Collection<Self> {
        &mut scene.connectors
    }

    fn from_item(item: &Item) -> Option<&Self> {
        match item {
            Item::Connector(c) => Some(c),
            _ => None,
        }
    }

    fn into_item(self) -> Item {
        Item::Connector(self)
    }

    fn translated(&self, delta: Vec2, world: &WorldBounds) -> Self {
        Self {
            ax: world.clamp_x(round_coord(self.ax + delta.x)),
            ay: world.clamp_y(round_coord(self.ay + delta.y)),
            bx: world.clamp_x(round_coord(self.bx + delta.x)),
            by: world.clamp_y(round_coord(self.by + delta.y)),
            ..self.clone()
        }
    }
}
