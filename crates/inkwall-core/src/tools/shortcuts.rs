//! Keyboard shortcut registry.

use super::ToolKind;
use crate::input::KeyEvent;

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    SetTool(ToolKind),
    Undo,
    Redo,
    Duplicate,
    /// Delete the selection. Only fires while something is selected.
    Delete,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    /// Lowercase key name
    pub key: &'static str,
    /// Ctrl, or Cmd on macOS
    pub command: bool,
    pub shift: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        command: bool,
        shift: bool,
        action: ShortcutAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            command,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.command {
            parts.push("Ctrl".to_string());
        }
        if self.shift {
            parts.push("Shift".to_string());
        }
        parts.push(self.key.to_uppercase());
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        use ShortcutAction::*;
        vec![
            Shortcut::new("z", true, false, Undo, "Undo"),
            Shortcut::new("z", true, true, Redo, "Redo"),
            Shortcut::new("y", true, false, Redo, "Redo"),
            Shortcut::new("d", true, false, Duplicate, "Duplicate selection"),
            Shortcut::new("delete", false, false, Delete, "Delete selection"),
            Shortcut::new("backspace", false, false, Delete, "Delete selection"),
            Shortcut::new("v", false, false, SetTool(ToolKind::Select), "Select"),
            Shortcut::new("p", false, false, SetTool(ToolKind::Draw), "Pen"),
            Shortcut::new("h", false, false, SetTool(ToolKind::Highlighter), "Highlighter"),
            Shortcut::new("n", false, false, SetTool(ToolKind::Sticky), "Sticky note"),
            Shortcut::new("t", false, false, SetTool(ToolKind::Text), "Text"),
            Shortcut::new("r", false, false, SetTool(ToolKind::Rect), "Rectangle"),
            Shortcut::new("e", false, false, SetTool(ToolKind::Ellipse), "Ellipse"),
            Shortcut::new("l", false, false, SetTool(ToolKind::Line), "Line"),
            Shortcut::new("a", false, false, SetTool(ToolKind::Arrow), "Arrow"),
            Shortcut::new("i", false, false, SetTool(ToolKind::Image), "Image"),
        ]
    }

    /// Resolve a key press.
    ///
    /// Shift only matters for Ctrl+Z versus Ctrl+Shift+Z. Delete and
    /// Backspace only resolve while something is selected. Tool letters
    /// never fire with Ctrl/Cmd held.
    pub fn resolve(event: &KeyEvent, has_selection: bool) -> Option<ShortcutAction> {
        let key = event.key.to_lowercase();
        let command = event.modifiers.command();
        let shift = event.modifiers.shift;
        let all = Self::all();

        let found = all
            .iter()
            .find(|s| s.key == key && s.command == command && s.shift == shift)
            .or_else(|| {
                // Redo with Y does not care about shift.
                all.iter()
                    .find(|s| command && s.command && s.key == key && s.key != "z")
            })
            .or_else(|| {
                // Plain keys work regardless of shift.
                all.iter().find(|s| !command && !s.command && s.key == key)
            })?;

        match found.action {
            ShortcutAction::Delete if !has_selection => None,
            action => Some(action),
        }
    }
}
