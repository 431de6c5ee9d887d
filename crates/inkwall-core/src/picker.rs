//! Hit testing: which item, and which manipulation, a world point addresses.
//!
//! Kinds are tried in a fixed order (stroke, shape, note, image,
//! connector) and within a kind the newest item wins. The first match is
//! returned even if a later candidate is geometrically closer.

use kurbo::{Point, Rect};

use crate::config::BoardConfig;
use crate::geometry::{near_corner, rect_contains};
use crate::items::{Endpoint, ItemId, ItemKind, Selection, TextMeasure};
use crate::scene::Scene;

/// How a drag on the picked item behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Move,
    /// Resize from the bottom-right corner.
    Scale,
    EndA,
    EndB,
    /// Connectors only: steer whichever endpoint is near, else move.
    Auto,
}

impl From<Endpoint> for DragMode {
    fn from(end: Endpoint) -> Self {
        match end {
            Endpoint::A => DragMode::EndA,
            Endpoint::B => DragMode::EndB,
        }
    }
}

/// Result of a pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub target: Selection,
    pub mode: DragMode,
}

/// Hit tolerances in world units at the current scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    /// Stroke distance and resize corner radius
    pub item: f64,
    /// Connector endpoints and body
    pub connector: f64,
}

impl Tolerance {
    /// Convert the configured screen-pixel tolerances for `scale`.
    pub fn at_scale(config: &BoardConfig, scale: f64) -> Self {
        Self {
            item: config.hit_tolerance / scale,
            connector: config.connector_tolerance / scale,
        }
    }
}

/// Resolve the item under `point`.
pub fn pick(scene: &Scene, point: Point, tolerance: Tolerance, measure: &dyn TextMeasure) -> Option<Pick> {
    if let Some(id) = stroke_at(scene, point, tolerance.item) {
        return Some(Pick {
            target: Selection::new(ItemKind::Stroke, id.clone()),
            mode: DragMode::Move,
        });
    }

    let corner_mode = |rect: Rect| {
        if near_corner(rect, point, tolerance.item) {
            DragMode::Scale
        } else {
            DragMode::Move
        }
    };

    if let Some(entry) = scene.shapes.iter_topmost().find(|e| e.item.contains(point)) {
        return Some(Pick {
            target: Selection::new(ItemKind::Shape, entry.id.clone()),
            mode: corner_mode(entry.item.rect()),
        });
    }

    if let Some((id, bounds)) = scene
        .notes
        .iter_topmost()
        .map(|e| (&e.id, e.item.bounds(measure)))
        .find(|(_, bounds)| rect_contains(*bounds, point))
    {
        return Some(Pick {
            target: Selection::new(ItemKind::Note, id.clone()),
            mode: corner_mode(bounds),
        });
    }

    if let Some(entry) = scene.images.iter_topmost().find(|e| e.item.contains(point)) {
        return Some(Pick {
            target: Selection::new(ItemKind::Image, entry.id.clone()),
            mode: corner_mode(entry.item.rect()),
        });
    }

    for entry in scene.connectors.iter_topmost() {
        let connector = &entry.item;
        let mode = match connector.endpoint_near(point, tolerance.connector) {
            Some(end) => DragMode::from(end),
            None if connector.distance(point) < tolerance.connector => DragMode::Move,
            None => continue,
        };
        return Some(Pick {
            target: Selection::new(ItemKind::Connector, entry.id.clone()),
            mode,
        });
    }

    None
}

/// Topmost stroke within `tolerance` of `point`.
pub fn stroke_at(scene: &Scene, point: Point, tolerance: f64) -> Option<&ItemId> {
    scene
        .strokes
        .iter_topmost()
        .find(|e| e.item.hit_test(point, tolerance))
        .map(|e| &e.id)
}

/// Topmost note whose measured box contains `point`.
pub fn note_at<'a>(scene: &'a Scene, point: Point, measure: &dyn TextMeasure) -> Option<&'a ItemId> {
    scene
        .notes
        .iter_topmost()
        .find(|e| rect_contains(e.item.bounds(measure), point))
        .map(|e| &e.id)
}
