//! Pointer and keyboard events as the board receives them.

use kurbo::Point;
use serde::{Deserialize, Serialize};

// Use web_time for WASM compatibility
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Identifies one pointer (mouse, pen or finger) for the life of a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointerId(pub u64);

impl PointerId {
    /// The single pointer of a plain mouse.
    pub const MOUSE: PointerId = PointerId(1);
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Buttons held during a move or leave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buttons {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
}

impl Buttons {
    pub const NONE: Buttons = Buttons {
        left: false,
        right: false,
        middle: false,
    };

    pub const LEFT: Buttons = Buttons {
        left: true,
        right: false,
        middle: false,
    };

    pub const RIGHT: Buttons = Buttons {
        left: false,
        right: true,
        middle: false,
    };

    pub fn is_empty(&self) -> bool {
        !(self.left || self.right || self.middle)
    }

    pub fn contains(&self, button: MouseButton) -> bool {
        match button {
            MouseButton::Left => self.left,
            MouseButton::Right => self.right,
            MouseButton::Middle => self.middle,
        }
    }
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Ctrl, or Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        pointer: PointerId,
        position: Point,
        button: MouseButton,
    },
    Move {
        pointer: PointerId,
        position: Point,
        buttons: Buttons,
    },
    Up {
        pointer: PointerId,
        position: Point,
    },
    /// The platform took the pointer away (touch cancelled, focus lost).
    Cancel { pointer: PointerId },
    /// The pointer left the surface.
    Leave { pointer: PointerId, buttons: Buttons },
    /// Wheel scroll; positive `delta` zooms out.
    Wheel { position: Point, delta: f64 },
}

/// A key press. `key` is the logical key name, e.g. `"z"` or `"Delete"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    /// A key with no modifiers held.
    pub fn plain(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME_MS: u128 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Detects double-clicks from a stream of primary presses.
#[derive(Debug, Clone, Default)]
pub struct ClickTracker {
    last_click: Option<(Instant, Point)>,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a press at `position` (screen space). Returns `true` when it
    /// completes a double-click.
    pub fn register(&mut self, position: Point, now: Instant) -> bool {
        if let Some((time, last)) = self.last_click {
            let elapsed = now.saturating_duration_since(time).as_millis();
            if elapsed < DOUBLE_CLICK_TIME_MS && (position - last).hypot() < DOUBLE_CLICK_DISTANCE {
                // Reset so a triple click is not a second double-click
                self.last_click = None;
                return true;
            }
        }
        self.last_click = Some((now, position));
        false
    }

    pub fn reset(&mut self) {
        self.last_click = None;
    }
}
