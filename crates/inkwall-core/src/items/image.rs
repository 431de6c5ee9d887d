//! Embedded raster images.

use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

use super::{BoardItem, Item, ItemKind};
use crate::config::WorldBounds;
use crate::geometry::{rect_contains, round_coord};
use crate::scene::{Collection, Scene};

/// Image format of an encoded payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_ascii_lowercase().as_str() {
            "image/png" => Some(ImageFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// A parsed `data:<mime>;base64,<bytes>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    /// Parse a base64 data URL. Returns `None` for anything else.
    pub fn parse(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (header, body) = rest.split_once(',')?;
        let mime = header.strip_suffix(";base64")?;
        let bytes = STANDARD.decode(body.trim()).ok()?;
        Some(Self {
            mime: mime.to_string(),
            bytes,
        })
    }

    /// Encode bytes as a data URL.
    pub fn encode(format: ImageFormat, bytes: &[u8]) -> String {
        format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(bytes))
    }

    /// Format from the declared MIME type, falling back to the bytes.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime).or_else(|| ImageFormat::from_magic_bytes(&self.bytes))
    }
}

/// An image placed on the board. `data` is an opaque encoded payload,
/// normally a data URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub data: String,
}

impl Image {
    /// Place an encoded image with its top-left at `at`, kept fully in-world.
    pub fn placed(at: Point, data: String, w: f64, h: f64, world: &WorldBounds) -> Self {
        let origin = world.clamp_origin(Point::new(round_coord(at.x), round_coord(at.y)), w, h);
        Self {
            x: origin.x,
            y: origin.y,
            w,
            h,
            data,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    pub fn contains(&self, point: Point) -> bool {
        rect_contains(self.rect(), point)
    }

    /// Width and height after a corner drag of `delta`.
    pub fn resized(&self, delta: Vec2, min_size: f64, world: &WorldBounds) -> (f64, f64) {
        let size = world.resize_extent(Point::new(self.x, self.y), Size::new(self.w, self.h), delta, min_size);
        (size.width, size.height)
    }
}

impl BoardItem for Image {
    const KIND: ItemKind = ItemKind::Image;

    fn collection(scene: &Scene) -> &Collection<Self> {
        &scene.images
    }

    fn collection_mut(scene: &mut Scene) -> &mut Collection<Self> {
        &mut scene.images
    }

    fn from_item(item: &Item) -> Option<&Self> {
        match item {
            Item::Image(i) => Some(i),
            _ => None,
        }
    }

    fn into_item(self) -> Item {
        Item::Image(self)
    }

    fn translated(&self, delta: Vec2, world: &WorldBounds) -> Self {
        let origin = world.clamp_origin(
            Point::new(round_coord(self.x + delta.x), round_coord(self.y + delta.y)),
            self.w,
            self.h,
        );
        Self {
            x: origin.x,
            y: origin.y,
            ..self.clone()
        }
    }
}
