//! Image codec collaborator and the decode cache.

use std::collections::HashMap;
use std::rc::Rc;

use thiserror::Error;

use crate::items::ItemId;
use crate::store::BoxFuture;

/// Codec errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("Unsupported image: {0}")]
    Unsupported(String),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// A decoded raster handed to the board for placement.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    /// RGBA8 pixels, row-major
    pub pixels: Vec<u8>,
}

/// Compressed, transportable form of an image.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    /// Encoded payload, normally a data URL
    pub payload: String,
    pub width: u32,
    pub height: u32,
}

/// Pixels decoded from a stored payload, ready for a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Image compression and decoding, supplied by the host.
///
/// Returned futures own everything they need so they can run while the
/// board keeps handling input.
pub trait ImageCodec {
    /// Downscale so neither side exceeds `max_dimension`, then encode.
    fn compress(
        &self,
        image: RawImage,
        max_dimension: u32,
    ) -> BoxFuture<'static, Result<EncodedImage, CodecError>>;

    /// Decode a stored payload.
    fn decode(&self, payload: String) -> BoxFuture<'static, Result<DecodedImage, CodecError>>;
}

/// Size after scaling `width`x`height` down to fit in `max_dimension`.
///
/// Images already small enough keep their size.
pub fn fit_within(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest == 0 {
        return (width, height);
    }
    let scale = (max_dimension as f64 / longest as f64).min(1.0);
    (
        (width as f64 * scale).round() as u32,
        (height as f64 * scale).round() as u32,
    )
}

#[derive(Debug, Clone)]
enum Slot {
    Loading(u64),
    Ready(Rc<DecodedImage>),
}

/// Decoded images keyed by item id.
///
/// Each decode request gets a ticket. A result is only stored if its
/// ticket is still current, so an entry evicted mid-decode never comes
/// back with stale pixels.
#[derive(Debug, Default)]
pub struct DecodeCache {
    slots: HashMap<ItemId, Slot>,
    next_ticket: u64,
}

impl DecodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &ItemId) -> Option<Rc<DecodedImage>> {
        match self.slots.get(id) {
            Some(Slot::Ready(image)) => Some(Rc::clone(image)),
            _ => None,
        }
    }

    /// Start a decode for `id`. Returns `None` if one is loaded or running.
    pub fn begin(&mut self, id: &ItemId) -> Option<u64> {
        if self.slots.contains_key(id) {
            return None;
        }
        self.next_ticket += 1;
        self.slots.insert(id.clone(), Slot::Loading(self.next_ticket));
        Some(self.next_ticket)
    }

    /// Store a finished decode. Returns `false` if the ticket went stale.
    pub fn complete(&mut self, id: &ItemId, ticket: u64, image: DecodedImage) -> bool {
        match self.slots.get(id) {
            Some(Slot::Loading(current)) if *current == ticket => {
                self.slots.insert(id.clone(), Slot::Ready(Rc::new(image)));
                true
            }
            _ => false,
        }
    }

    /// Drop a failed decode so it can be retried.
    pub fn fail(&mut self, id: &ItemId, ticket: u64) {
        if matches!(self.slots.get(id), Some(Slot::Loading(current)) if *current == ticket) {
            self.slots.remove(id);
        }
    }

    pub fn evict(&mut self, id: &ItemId) {
        self.slots.remove(id);
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixels() -> DecodedImage {
        DecodedImage {
            width: 1,
            height: 1,
            pixels: vec![0, 0, 0, 255],
        }
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(2048, 1024, 1024), (1024, 512));
        assert_eq!(fit_within(300, 200, 1024), (300, 200));
        assert_eq!(fit_within(1000, 3000, 1024), (341, 1024));
        assert_eq!(fit_within(0, 0, 1024), (0, 0));
    }

    #[test]
    fn test_cache_lifecycle() {
        let mut cache = DecodeCache::new();
        let id = ItemId::from("img");
        let ticket = cache.begin(&id).unwrap();
        assert!(cache.begin(&id).is_none());
        assert!(cache.get(&id).is_none());
        assert!(cache.complete(&id, ticket, pixels()));
        assert_eq!(cache.get(&id).unwrap().width, 1);
    }

    #[test]
    fn test_evicted_decode_is_discarded() {
        let mut cache = DecodeCache::new();
        let id = ItemId::from("img");
        let stale = cache.begin(&id).unwrap();
        cache.evict(&id);
        let fresh = cache.begin(&id).unwrap();
        assert!(!cache.complete(&id, stale, pixels()));
        assert!(cache.get(&id).is_none());
        assert!(cache.complete(&id, fresh, pixels()));
    }

    #[test]
    fn test_failed_decode_can_retry() {
        let mut cache = DecodeCache::new();
        let id = ItemId::from("img");
        let ticket = cache.begin(&id).unwrap();
        cache.fail(&id, ticket);
        assert!(cache.is_empty());
        assert!(cache.begin(&id).is_some());
    }
}
