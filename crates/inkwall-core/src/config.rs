//! Board configuration.
//!
//! Every tunable the engine uses lives here so a host can ship its own
//! values as JSON. Missing keys fall back to the defaults below.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{clamp, round_coord};

/// Side length of the default square world.
pub const WORLD_SIZE: f64 = 20000.0;

/// Default number of commands kept for undo.
pub const DEFAULT_HISTORY_CAPACITY: usize = 150;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Axis-aligned bounds of the world coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_x: WORLD_SIZE,
            max_y: WORLD_SIZE,
        }
    }
}

impl WorldBounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn clamp_x(&self, x: f64) -> f64 {
        clamp(x, self.min_x, self.max_x)
    }

    pub fn clamp_y(&self, y: f64) -> f64 {
        clamp(y, self.min_y, self.max_y)
    }

    /// Clamp a point into the world.
    pub fn clamp_point(&self, point: Point) -> Point {
        Point::new(self.clamp_x(point.x), self.clamp_y(point.y))
    }

    /// Clamp a top-left corner so a `w`x`h` box stays fully inside the world.
    ///
    /// Boxes larger than the world are pinned to the world minimum.
    pub fn clamp_origin(&self, origin: Point, w: f64, h: f64) -> Point {
        let max_x = (self.max_x - w).max(self.min_x);
        let max_y = (self.max_y - h).max(self.min_y);
        Point::new(
            clamp(origin.x, self.min_x, max_x),
            clamp(origin.y, self.min_y, max_y),
        )
    }

    /// Size of a box at `origin` after its bottom-right corner moved by `delta`.
    ///
    /// Each side is floored at `min_size`; the far edge may not pass the
    /// world maximum, which wins over the floor at the very edge.
    pub fn resize_extent(&self, origin: Point, size: Size, delta: Vec2, min_size: f64) -> Size {
        Size::new(
            clamp(round_coord(size.width + delta.x), min_size, self.max_x - origin.x),
            clamp(round_coord(size.height + delta.y), min_size, self.max_y - origin.y),
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// Tunables for a board session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Identifier of the shared board all collections live under.
    pub board_id: String,
    pub world: WorldBounds,
    pub min_scale: f64,
    pub max_scale: f64,
    pub history_capacity: usize,
    /// Item hit tolerance in screen pixels (strokes and resize corners).
    pub hit_tolerance: f64,
    /// Connector hit tolerance in screen pixels.
    pub connector_tolerance: f64,
    /// Grid step freehand points are snapped to before simplification.
    pub quantize_step: f64,
    pub simplify_epsilon: f64,
    /// Smallest width/height a resize drag may produce.
    pub min_resize: f64,
    /// Smallest width/height of a newly dragged-out shape.
    pub min_shape_size: f64,
    pub min_connector_length: f64,
    pub duplicate_offset: f64,
    pub image_max_dimension: u32,
    pub highlighter_max_opacity: f64,
    /// Password required for the bulk clear. `None` disables clearing.
    pub clear_password: Option<String>,
    pub secret_click_count: usize,
    pub secret_click_window_ms: u64,
    /// Grab connectors in auto mode: the endpoint nearest the pointer is
    /// steered on every move, otherwise the whole connector moves.
    pub auto_steer_connectors: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            board_id: "default".to_string(),
            world: WorldBounds::default(),
            min_scale: 0.25,
            max_scale: 8.0,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            hit_tolerance: 24.0,
            connector_tolerance: 18.0,
            quantize_step: 0.5,
            simplify_epsilon: 1.2,
            min_resize: 16.0,
            min_shape_size: 24.0,
            min_connector_length: 8.0,
            duplicate_offset: 32.0,
            image_max_dimension: 1024,
            highlighter_max_opacity: 0.45,
            clear_password: None,
            secret_click_count: 5,
            secret_click_window_ms: 1500,
            auto_steer_connectors: false,
        }
    }
}

impl BoardConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_scale <= 0.0 {
            return Err(ConfigError::Invalid("min_scale must be positive".into()));
        }
        if self.min_scale > self.max_scale {
            return Err(ConfigError::Invalid(format!(
                "min_scale {} exceeds max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        if self.world.width() <= 0.0 || self.world.height() <= 0.0 {
            return Err(ConfigError::Invalid("world bounds are empty".into()));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid("history_capacity must be at least 1".into()));
        }
        Ok(())
    }
}
