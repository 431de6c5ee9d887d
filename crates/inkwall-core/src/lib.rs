//! Inkwall Core Library
//!
//! Scene model, interaction state machine and sync plumbing for the Inkwall
//! shared whiteboard. Rendering and the remote store are supplied by the host.

pub mod board;
pub mod config;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod input;
pub mod items;
pub mod media;
pub mod mirror;
pub mod picker;
pub mod scene;
pub mod store;
pub mod tools;
pub mod viewport;

pub use board::{Board, BoardError, BoardResult, Inspector, Pending, SyncReport};
pub use config::{BoardConfig, ConfigError, WorldBounds};
pub use gesture::{Gesture, Preview};
pub use history::{Command, CommandLog, History};
pub use input::{Buttons, KeyEvent, Modifiers, MouseButton, PointerEvent, PointerId};
pub use items::{Item, ItemId, ItemKind, Selection, SerializableColor};
pub use media::{CodecError, DecodedImage, EncodedImage, ImageCodec, RawImage};
pub use scene::Scene;
pub use store::{MemoryBackend, MemoryStore, RemoteStore, StoreError, StoreEvent, StoreResult};
pub use tools::{ToolEffect, ToolKind, ToolStyle};
pub use viewport::Viewport;
