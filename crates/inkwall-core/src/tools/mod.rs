//! Tool system: the active tool, the style new items take, and the
//! requests the board makes of its host UI.

mod shortcuts;

pub use shortcuts::{Shortcut, ShortcutAction, ShortcutRegistry};

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::items::{ItemId, SerializableColor, ShapeType};

// Use web-time on WASM, std::time otherwise
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Draw,
    Highlighter,
    Erase,
    Text,
    Sticky,
    Rect,
    Ellipse,
    Line,
    Arrow,
    Image,
}

impl ToolKind {
    /// The shape a drag-create tool produces.
    pub fn shape_type(&self) -> Option<ShapeType> {
        match self {
            ToolKind::Rect => Some(ShapeType::Rect),
            ToolKind::Ellipse => Some(ShapeType::Ellipse),
            _ => None,
        }
    }

    /// For connector tools, whether the connector gets an arrowhead.
    pub fn connector_arrow(&self) -> Option<bool> {
        match self {
            ToolKind::Line => Some(false),
            ToolKind::Arrow => Some(true),
            _ => None,
        }
    }
}

/// Style applied to new items, and mirrored from the selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolStyle {
    pub stroke: SerializableColor,
    pub fill: SerializableColor,
    /// Integer line width, at least 1
    pub width: f64,
    pub opacity: f64,
}

impl Default for ToolStyle {
    fn default() -> Self {
        Self {
            stroke: SerializableColor::new(0xe5, 0xe7, 0xeb, 255),
            fill: SerializableColor::new(0x1f, 0x29, 0x37, 255),
            width: 4.0,
            opacity: 1.0,
        }
    }
}

impl ToolStyle {
    /// Normalize a width the way the width control does: whole numbers,
    /// never below 1.
    pub fn normalize_width(width: f64) -> f64 {
        if width.is_finite() { width.trunc().max(1.0) } else { 1.0 }
    }

    pub fn normalize_opacity(opacity: f64) -> f64 {
        if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 1.0 }
    }
}

/// Something the board needs the host UI to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEffect {
    /// Open a file picker; answer with `Board::place_image`.
    RequestImageFile,
    /// Ask for the bulk-clear password; answer with `Board::request_clear`.
    RequestClearPassword,
    /// Ask for note text at a world point; answer with `Board::place_text`.
    RequestText { at: kurbo::Point },
    /// Offer the note's text for editing; answer with `Board::edit_note_text`.
    EditNoteText { id: ItemId, text: String },
    /// Show a message to the user.
    Notify(String),
}

/// Manages the current tool, its style and the secret clear sequence.
#[derive(Debug, Clone)]
pub struct ToolController {
    current: ToolKind,
    pub style: ToolStyle,
    highlighter_max_opacity: f64,
    secret_clicks: Vec<Instant>,
    secret_click_count: usize,
    secret_click_window: Duration,
}

impl Default for ToolController {
    fn default() -> Self {
        Self::new(0.45, 5, Duration::from_millis(1500))
    }
}

impl ToolController {
    pub fn new(highlighter_max_opacity: f64, secret_click_count: usize, secret_click_window: Duration) -> Self {
        Self {
            current: ToolKind::default(),
            style: ToolStyle::default(),
            highlighter_max_opacity,
            secret_clicks: Vec::new(),
            secret_click_count: secret_click_count.max(1),
            secret_click_window,
        }
    }

    pub fn current(&self) -> ToolKind {
        self.current
    }

    /// Switch tools. Returns the request the new tool makes of the UI, if any.
    pub fn set_tool(&mut self, tool: ToolKind) -> Option<ToolEffect> {
        self.current = tool;
        match tool {
            ToolKind::Highlighter => {
                self.style.opacity = self.style.opacity.min(self.highlighter_max_opacity);
                None
            }
            ToolKind::Image => Some(ToolEffect::RequestImageFile),
            _ => None,
        }
    }

    /// Count a click on the erase tool button at `now`.
    ///
    /// Returns `true` when the clicks inside the window reach the secret
    /// count, which also resets the sequence.
    pub fn track_erase_click(&mut self, now: Instant) -> bool {
        let window = self.secret_click_window;
        self.secret_clicks
            .retain(|t| now.saturating_duration_since(*t) <= window);
        self.secret_clicks.push(now);
        if self.secret_clicks.len() >= self.secret_click_count {
            self.secret_clicks.clear();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlighter_caps_opacity() {
        let mut tools = ToolController::default();
        tools.style.opacity = 0.9;
        assert_eq!(tools.set_tool(ToolKind::Highlighter), None);
        assert!((tools.style.opacity - 0.45).abs() < f64::EPSILON);

        // Lower opacity is left alone.
        tools.style.opacity = 0.2;
        tools.set_tool(ToolKind::Highlighter);
        assert!((tools.style.opacity - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_image_tool_requests_file() {
        let mut tools = ToolController::default();
        assert_eq!(tools.set_tool(ToolKind::Image), Some(ToolEffect::RequestImageFile));
        assert_eq!(tools.current(), ToolKind::Image);
    }

    #[test]
    fn test_secret_clicks() {
        let mut tools = ToolController::default();
        let t0 = Instant::now();
        for i in 0..4 {
            assert!(!tools.track_erase_click(t0 + Duration::from_millis(i * 100)));
        }
        assert!(tools.track_erase_click(t0 + Duration::from_millis(400)));
        // Sequence resets after firing.
        assert!(!tools.track_erase_click(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_secret_clicks_expire() {
        let mut tools = ToolController::default();
        let t0 = Instant::now();
        for i in 0..4 {
            tools.track_erase_click(t0 + Duration::from_millis(i * 100));
        }
        assert!(!tools.track_erase_click(t0 + Duration::from_millis(2000)));
    }

    #[test]
    fn test_style_normalization() {
        assert!((ToolStyle::normalize_width(0.0) - 1.0).abs() < f64::EPSILON);
        assert!((ToolStyle::normalize_width(6.8) - 6.0).abs() < f64::EPSILON);
        assert!((ToolStyle::normalize_opacity(1.5) - 1.0).abs() < f64::EPSILON);
        assert!((ToolStyle::normalize_opacity(f64::NAN) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tool_kinds() {
        assert_eq!(ToolKind::Ellipse.shape_type(), Some(ShapeType::Ellipse));
        assert_eq!(ToolKind::Arrow.connector_arrow(), Some(true));
        assert_eq!(ToolKind::Draw.connector_arrow(), None);
    }
}
