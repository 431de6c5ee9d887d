//! Board items: the five kinds of objects a board holds.

mod color;
mod connector;
mod image;
mod note;
mod shape;
mod stroke;

pub use color::{DARK_TEXT, LIGHT_TEXT, SerializableColor};
pub use connector::{Connector, Endpoint};
pub use image::{DataUrl, Image, ImageFormat};
pub use note::{
    ApproxTextMeasure, DEFAULT_NOTE_SIZE, MAX_NOTE_SIZE, MIN_NOTE_SIZE, Note, NoteKind, TextMeasure,
    TextMetrics,
};
pub use shape::{Shape, ShapeType};
pub use stroke::{BlendMode, Stroke};

use std::fmt;

use kurbo::{Point, Rect, Vec2};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::WorldBounds;
use crate::scene::{Collection, Scene};

/// Field map of an item as stored remotely.
pub type Fields = serde_json::Map<String, Value>;

/// The five item collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Stroke,
    Note,
    Shape,
    Connector,
    Image,
}

impl ItemKind {
    /// All kinds, in hit-test priority order.
    pub const ALL: [ItemKind; 5] = [
        ItemKind::Stroke,
        ItemKind::Shape,
        ItemKind::Note,
        ItemKind::Image,
        ItemKind::Connector,
    ];

    /// Name of the remote collection holding this kind.
    pub fn collection_name(&self) -> &'static str {
        match self {
            ItemKind::Stroke => "strokes",
            ItemKind::Note => "notes",
            ItemKind::Shape => "shapes",
            ItemKind::Connector => "connectors",
            ItemKind::Image => "images",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection_name())
    }
}

/// Store-assigned key of an item, unique within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Reference to one item: its collection plus its key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub kind: ItemKind,
    pub id: ItemId,
}

impl Selection {
    pub fn new(kind: ItemKind, id: impl Into<ItemId>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn is(&self, kind: ItemKind, id: &ItemId) -> bool {
        self.kind == kind && &self.id == id
    }
}

/// Common behavior of the typed item structs.
pub trait BoardItem: Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned {
    const KIND: ItemKind;

    fn collection(scene: &Scene) -> &Collection<Self>;

    fn collection_mut(scene: &mut Scene) -> &mut Collection<Self>;

    /// Borrow the typed item out of an [`Item`], if it is this kind.
    fn from_item(item: &Item) -> Option<&Self>;

    fn into_item(self) -> Item;

    /// Copy moved by `delta`, kept inside the world.
    fn translated(&self, delta: Vec2, world: &WorldBounds) -> Self;

    /// Serialize into a remote field map.
    fn to_fields(&self) -> Fields {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                log::warn!("{} serialized to non-object {other}", Self::KIND);
                Fields::new()
            }
            Err(e) => {
                log::warn!("Failed to serialize {}: {e}", Self::KIND);
                Fields::new()
            }
        }
    }

    /// Decode a remote field map.
    fn from_fields(fields: Fields) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(fields))
    }
}

/// Any board item.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Stroke(Stroke),
    Note(Note),
    Shape(Shape),
    Connector(Connector),
    Image(Image),
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Stroke(_) => ItemKind::Stroke,
            Item::Note(_) => ItemKind::Note,
            Item::Shape(_) => ItemKind::Shape,
            Item::Connector(_) => ItemKind::Connector,
            Item::Image(_) => ItemKind::Image,
        }
    }

    /// Decode a field map as the given kind.
    pub fn from_fields(kind: ItemKind, fields: Fields) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            ItemKind::Stroke => Item::Stroke(Stroke::from_fields(fields)?),
            ItemKind::Note => Item::Note(Note::from_fields(fields)?),
            ItemKind::Shape => Item::Shape(Shape::from_fields(fields)?),
            ItemKind::Connector => Item::Connector(Connector::from_fields(fields)?),
            ItemKind::Image => Item::Image(Image::from_fields(fields)?),
        })
    }

    pub fn to_fields(&self) -> Fields {
        match self {
            Item::Stroke(s) => s.to_fields(),
            Item::Note(n) => n.to_fields(),
            Item::Shape(s) => s.to_fields(),
            Item::Connector(c) => c.to_fields(),
            Item::Image(i) => i.to_fields(),
        }
    }

    /// Copy moved by `delta`, kept inside the world.
    pub fn translated(&self, delta: Vec2, world: &WorldBounds) -> Item {
        match self {
            Item::Stroke(s) => s.translated(delta, world).into_item(),
            Item::Note(n) => n.translated(delta, world).into_item(),
            Item::Shape(s) => s.translated(delta, world).into_item(),
            Item::Connector(c) => c.translated(delta, world).into_item(),
            Item::Image(i) => i.translated(delta, world).into_item(),
        }
    }

    /// Bounding box in world coordinates.
    pub fn bounds(&self, measure: &dyn TextMeasure) -> Rect {
        match self {
            Item::Stroke(s) => s.bounds(),
            Item::Note(n) => n.bounds(measure),
            Item::Shape(s) => s.rect(),
            Item::Connector(c) => c.bounds(),
            Item::Image(i) => i.rect(),
        }
    }

    /// Handle points drawn around the item when it is selected.
    pub fn handles(&self, measure: &dyn TextMeasure) -> Vec<Point> {
        match self {
            Item::Stroke(_) => Vec::new(),
            Item::Connector(c) => vec![c.a(), c.b()],
            other => {
                let rect = other.bounds(measure);
                vec![Point::new(rect.x1, rect.y1)]
            }
        }
    }
}

/// Compute the partial update turning `before` into `after`.
///
/// Returns `(undo, redo)` field maps holding only the keys whose values
/// differ. Keys missing on one side appear as `null`, which removes the
/// field when applied. Returns `None` when nothing changed.
pub fn diff_fields(before: &Fields, after: &Fields) -> Option<(Fields, Fields)> {
    let mut undo = Fields::new();
    let mut redo = Fields::new();
    for (key, value) in after {
        let old = before.get(key).unwrap_or(&Value::Null);
        if old != value {
            undo.insert(key.clone(), old.clone());
            redo.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in before {
        if !after.contains_key(key) && !value.is_null() {
            undo.insert(key.clone(), value.clone());
            redo.insert(key.clone(), Value::Null);
        }
    }
    if redo.is_empty() { None } else { Some((undo, redo)) }
}
