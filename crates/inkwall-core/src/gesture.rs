//! Per-pointer gesture state machine.
//!
//! Every pointer that is down owns exactly one [`Gesture`]. A pointer with
//! no entry is idle. Gestures never write to the store themselves; the
//! board turns a finished gesture into a command.

use kurbo::{Point, Rect, Size, Vec2};

use crate::config::WorldBounds;
use crate::geometry::rounded_delta;
use crate::input::MouseButton;
use crate::items::{BoardItem, Endpoint, Fields, Item, Selection, ShapeType, diff_fields};
use crate::picker::DragMode;

/// Smallest extent of the creation rubber band, in world units.
const PREVIEW_MIN_EXTENT: f64 = 8.0;

/// Side of the eraser cursor square, in world units.
const ERASER_SIZE: f64 = 20.0;

/// An in-progress pointer interaction.
#[derive(Debug, Clone)]
pub enum Gesture {
    /// Dragging the view.
    Panning {
        /// Screen position where the pan started
        start: Point,
        /// Viewport offset at that moment
        origin: Vec2,
        /// Button holding the pan; releasing it ends the pan
        button: MouseButton,
    },
    /// Capturing a freehand path.
    Drawing { path: Vec<Point>, highlighter: bool },
    /// Eraser following the pointer.
    Erasing { point: Point },
    /// Dragging out a new rectangle or ellipse.
    CreatingShape {
        shape_type: ShapeType,
        start: Point,
        current: Point,
    },
    /// Rubber-banding a new line or arrow.
    CreatingConnector {
        arrow: bool,
        start: Point,
        current: Point,
    },
    /// Moving or resizing an existing item.
    Dragging(DragState),
}

impl Gesture {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Panning { .. } => "pan",
            Gesture::Drawing { .. } => "draw",
            Gesture::Erasing { .. } => "erase",
            Gesture::CreatingShape { .. } => "shape",
            Gesture::CreatingConnector { .. } => "connector",
            Gesture::Dragging(_) => "drag",
        }
    }

    /// What to draw on top of the scene while the gesture runs.
    pub fn preview(&self) -> Option<Preview> {
        match self {
            Gesture::Drawing { path, highlighter } => Some(Preview::Path {
                points: path.clone(),
                highlighter: *highlighter,
            }),
            Gesture::Erasing { point } => Some(Preview::Eraser {
                rect: Rect::from_center_size(*point, Size::new(ERASER_SIZE, ERASER_SIZE)),
            }),
            Gesture::CreatingShape {
                shape_type,
                start,
                current,
            } => Some(Preview::Box {
                shape_type: *shape_type,
                rect: Rect::from_origin_size(
                    Point::new(start.x.min(current.x), start.y.min(current.y)),
                    Size::new(
                        (current.x - start.x).abs().max(PREVIEW_MIN_EXTENT),
                        (current.y - start.y).abs().max(PREVIEW_MIN_EXTENT),
                    ),
                ),
            }),
            Gesture::CreatingConnector {
                arrow,
                start,
                current,
            } => Some(Preview::Connector {
                a: *start,
                b: *current,
                arrow: *arrow,
            }),
            Gesture::Panning { .. } | Gesture::Dragging(_) => None,
        }
    }
}

/// Transient overlay for an in-progress gesture, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    Path { points: Vec<Point>, highlighter: bool },
    Box { shape_type: ShapeType, rect: Rect },
    Connector { a: Point, b: Point, arrow: bool },
    Eraser { rect: Rect },
}

/// Limits a drag update has to respect.
#[derive(Debug, Clone, Copy)]
pub struct DragLimits {
    pub world: WorldBounds,
    /// Floor for resized widths and heights
    pub min_resize: f64,
    /// Endpoint radius for connectors in auto mode, world units
    pub endpoint_tolerance: f64,
}

/// A move or resize of one item.
///
/// Every update is computed from the snapshot taken at pointer-down plus
/// the total pointer delta, never incrementally.
#[derive(Debug, Clone)]
pub struct DragState {
    pub target: Selection,
    pub mode: DragMode,
    /// World point where the drag started
    pub start: Point,
    /// Snapshot at pointer-down
    pub original: Item,
    current: Option<Item>,
}

impl DragState {
    pub fn begin(target: Selection, mode: DragMode, start: Point, original: Item) -> Self {
        Self {
            target,
            mode,
            start,
            original,
            current: None,
        }
    }

    /// The live item, once the pointer has moved.
    pub fn current(&self) -> Option<&Item> {
        self.current.as_ref()
    }

    /// Recompute the live item for the pointer at `point`.
    pub fn update(&mut self, point: Point, limits: &DragLimits) -> &Item {
        let delta = point - self.start;
        let world = &limits.world;
        let next = match (&self.original, self.mode) {
            (Item::Connector(original), mode) => {
                let end = match mode {
                    DragMode::EndA => Some(Endpoint::A),
                    DragMode::EndB => Some(Endpoint::B),
                    DragMode::Auto => {
                        let live = match &self.current {
                            Some(Item::Connector(live)) => live,
                            _ => original,
                        };
                        live.endpoint_near(point, limits.endpoint_tolerance)
                    }
                    DragMode::Move | DragMode::Scale => None,
                };
                let moved = match end {
                    Some(Endpoint::A) => original.with_endpoint(Endpoint::A, original.a() + delta, world),
                    Some(Endpoint::B) => original.with_endpoint(Endpoint::B, original.b() + delta, world),
                    None => original.translated(delta, world),
                };
                Item::Connector(moved)
            }
            (Item::Stroke(original), _) => {
                Item::Stroke(original.translated(rounded_delta(self.start, point), world))
            }
            (Item::Note(original), DragMode::Scale) => {
                let mut note = original.clone();
                note.size = original.scaled_size(delta);
                Item::Note(note)
            }
            (Item::Shape(original), DragMode::Scale) => {
                let mut shape = original.clone();
                (shape.w, shape.h) = original.resized(delta, limits.min_resize, world);
                Item::Shape(shape)
            }
            (Item::Image(original), DragMode::Scale) => {
                let mut image = original.clone();
                (image.w, image.h) = original.resized(delta, limits.min_resize, world);
                Item::Image(image)
            }
            (original, _) => original.translated(delta, world),
        };
        self.current.insert(next)
    }

    /// Partial updates `(undo, redo)` for the fields the drag changed.
    ///
    /// `None` if the pointer never moved or the item ended where it began.
    pub fn changes(&self) -> Option<(Fields, Fields)> {
        let current = self.current.as_ref()?;
        diff_fields(&self.original.to_fields(), &current.to_fields())
    }
}
