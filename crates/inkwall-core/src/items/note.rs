//! Text and sticky notes.
//!
//! A note stores only its anchor, text and font size. Its box is measured
//! on demand through a [`TextMeasure`], so every client derives the same
//! bounds from the replicated text without syncing them.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

use super::{BoardItem, Item, ItemKind, SerializableColor};
use crate::config::WorldBounds;
use crate::geometry::{clamp, round_coord};
use crate::scene::{Collection, Scene};

/// Font size for new notes.
pub const DEFAULT_NOTE_SIZE: f64 = 20.0;
/// Smallest font size a scale drag may produce.
pub const MIN_NOTE_SIZE: f64 = 10.0;
/// Largest font size a scale drag may produce.
pub const MAX_NOTE_SIZE: f64 = 400.0;

const STICKY_PADDING: f64 = 16.0;
const TEXT_PADDING: f64 = 6.0;
const MIN_NOTE_WIDTH: f64 = 16.0;

/// Text measurement result for a single line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Advance width
    pub width: f64,
    /// Ascent above the baseline, if the backend reports it
    pub ascent: Option<f64>,
    /// Descent below the baseline, if the backend reports it
    pub descent: Option<f64>,
}

/// Text measurement capability supplied by the rendering backend.
pub trait TextMeasure {
    fn measure(&self, text: &str, font_size: f64) -> TextMetrics;
}

/// Measurement without a font engine, from average glyph width.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTextMeasure;

impl TextMeasure for ApproxTextMeasure {
    fn measure(&self, text: &str, font_size: f64) -> TextMetrics {
        // Average sans-serif advance
        let char_width_factor = 0.52;
        TextMetrics {
            width: text.chars().count() as f64 * font_size * char_width_factor,
            ascent: None,
            descent: None,
        }
    }
}

/// Whether a note is plain text or a sticky with a background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    #[default]
    Text,
    Sticky,
}

fn default_size() -> f64 {
    DEFAULT_NOTE_SIZE
}

fn default_opacity() -> f64 {
    1.0
}

fn default_text_color() -> SerializableColor {
    super::DARK_TEXT
}

/// A text or sticky note anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub text: String,
    /// Text color
    #[serde(default = "default_text_color")]
    pub color: SerializableColor,
    /// Background fill, stickies only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<SerializableColor>,
    #[serde(default = "default_size")]
    pub size: f64,
    #[serde(default)]
    pub kind: NoteKind,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

impl Note {
    /// Plain text note.
    pub fn text(at: Point, text: impl Into<String>, color: SerializableColor) -> Self {
        Self {
            x: round_coord(at.x),
            y: round_coord(at.y),
            text: text.into(),
            color,
            bg: None,
            size: DEFAULT_NOTE_SIZE,
            kind: NoteKind::Text,
            opacity: 1.0,
        }
    }

    /// Sticky note with a background and contrasting text color.
    pub fn sticky(at: Point, text: impl Into<String>, bg: SerializableColor) -> Self {
        Self {
            x: round_coord(at.x),
            y: round_coord(at.y),
            text: text.into(),
            color: bg.contrasting_text(),
            bg: Some(bg),
            size: DEFAULT_NOTE_SIZE,
            kind: NoteKind::Sticky,
            opacity: 1.0,
        }
    }

    pub fn padding(&self) -> f64 {
        match self.kind {
            NoteKind::Sticky => STICKY_PADDING,
            NoteKind::Text => TEXT_PADDING,
        }
    }

    /// Measured box size including padding.
    pub fn measure(&self, measure: &dyn TextMeasure) -> Size {
        let metrics = measure.measure(&self.text, self.size);
        let ascent = metrics.ascent.filter(|a| *a > 0.0).unwrap_or(self.size);
        let descent = metrics.descent.filter(|d| *d > 0.0).unwrap_or(self.size * 0.2);
        let padding = self.padding();
        Size::new(
            (metrics.width + padding * 2.0).max(MIN_NOTE_WIDTH),
            (ascent + descent + padding * 2.0).max(self.size + padding),
        )
    }

    pub fn bounds(&self, measure: &dyn TextMeasure) -> Rect {
        Rect::from_origin_size(Point::new(self.x, self.y), self.measure(measure))
    }

    /// Font size after a corner drag of `delta`.
    pub fn scaled_size(&self, delta: Vec2) -> f64 {
        clamp(
            round_coord(self.size + delta.x.max(delta.y) * 0.5),
            MIN_NOTE_SIZE,
            MAX_NOTE_SIZE,
        )
    }
}

impl BoardItem for Note {
    const KIND: ItemKind = ItemKind::Note;

    fn collection(scene: &Scene) -> &Collection<Self> {
        &scene.notes
    }

    fn collection_mut(scene: &mut Scene) -> &mut Collection<Self> {
        &mut scene.notes
    }

    fn from_item(item: &Item) -> Option<&Self> {
        match item {
            Item::Note(n) => Some(n),
            _ => None,
        }
    }

    fn into_item(self) -> Item {
        Item::Note(self)
    }

    fn translated(&self, delta: Vec2, world: &WorldBounds) -> Self {
        Self {
            x: world.clamp_x(round_coord(self.x + delta.x)),
            y: world.clamp_y(round_coord(self.y + delta.y)),
            ..self.clone()
        }
    }
}
