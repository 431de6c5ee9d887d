//! Viewport module for pan/zoom transforms over the bounded world.

use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::{BoardConfig, WorldBounds};
use crate::geometry::clamp;

/// Wheel delta that scales the view by a factor of `e`.
const WHEEL_ZOOM_RATE: f64 = 500.0;

/// Scale changes smaller than this are ignored.
const MIN_SCALE_STEP: f64 = 1e-4;

/// Viewport maps world coordinates onto the screen.
///
/// `offset` is the world coordinate shown at the top-left of the screen,
/// so `screen = (world - offset) * scale`. The offset is always clamped so
/// no area outside the world is visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Viewport {
    /// Current zoom factor
    pub scale: f64,
    /// World coordinate at the screen's top-left corner
    pub offset: Vec2,
    /// Screen size in pixels
    size: Size,
    min_scale: f64,
    max_scale: f64,
    world: WorldBounds,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&BoardConfig::default())
    }
}

impl Viewport {
    /// Create a viewport at 100% looking at the world origin.
    pub fn new(config: &BoardConfig) -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::new(config.world.min_x, config.world.min_y),
            size: Size::ZERO,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            world: config.world,
        }
    }

    /// Screen size in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Update the screen size and re-clamp.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
        self.clamp_offset();
    }

    /// Get the affine transform for rendering (world to screen).
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale) * Affine::translate(-self.offset)
    }

    /// Get the inverse transform (screen to world), without clamping.
    pub fn inverse_transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(1.0 / self.scale)
    }

    /// Convert a screen point to world coordinates, clamped to the world.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.world.clamp_point(self.inverse_transform() * screen_point)
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Convert a screen-pixel length to world units at the current scale.
    pub fn screen_to_world_len(&self, pixels: f64) -> f64 {
        pixels / self.scale
    }

    /// Zoom by a wheel delta, keeping the world point under `pointer` fixed.
    ///
    /// Returns `false` when the scale did not change.
    pub fn zoom_at(&mut self, pointer: Point, wheel_delta: f64) -> bool {
        let next = clamp(
            self.scale * (-wheel_delta / WHEEL_ZOOM_RATE).exp(),
            self.min_scale,
            self.max_scale,
        );
        if (next - self.scale).abs() < MIN_SCALE_STEP {
            return false;
        }

        let world_before = self.screen_to_world(pointer);
        self.scale = next;
        self.offset = world_before.to_vec2() - pointer.to_vec2() / next;
        self.clamp_offset();
        true
    }

    /// Pan so that the view sits at `start_offset` moved by a screen-space drag.
    pub fn pan_from(&mut self, start_offset: Vec2, screen_delta: Vec2) {
        self.offset = start_offset - screen_delta / self.scale;
        self.clamp_offset();
    }

    /// Pan by a delta in screen pixels.
    pub fn pan(&mut self, screen_delta: Vec2) {
        self.pan_from(self.offset, screen_delta);
    }

    /// Keep the visible area inside the world.
    pub fn clamp_offset(&mut self) {
        let view_w = self.size.width / self.scale;
        let view_h = self.size.height / self.scale;
        let max_x = if view_w >= self.world.width() {
            self.world.min_x
        } else {
            self.world.max_x - view_w
        };
        let max_y = if view_h >= self.world.height() {
            self.world.min_y
        } else {
            self.world.max_y - view_h
        };
        self.offset = Vec2::new(
            clamp(self.offset.x, self.world.min_x, max_x),
            clamp(self.offset.y, self.world.min_y, max_y),
        );
    }

    /// Zoom readout, e.g. `"125%"`.
    pub fn zoom_label(&self) -> String {
        format!("{}%", (self.scale * 100.0).round() as i64)
    }
}
