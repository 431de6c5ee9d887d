//! Shared helpers for the board scenario tests.

#![allow(dead_code)]

use inkwall_core::items::{DataUrl, Fields, ImageFormat, ItemId};
use inkwall_core::media::fit_within;
use inkwall_core::store::BoxFuture;
use inkwall_core::{
    Board, BoardConfig, Buttons, CodecError, DecodedImage, EncodedImage, ImageCodec, ItemKind,
    KeyEvent, MemoryBackend, MemoryStore, Modifiers, MouseButton, Pending, PointerId, RawImage,
};
use kurbo::{Point, Size};
use pollster::block_on;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn board_with(backend: &MemoryBackend, config: BoardConfig) -> Board<MemoryStore> {
    init_logger();
    let mut board = Board::new(config, backend.connect()).expect("config should validate");
    board.set_viewport_size(Size::new(1280.0, 800.0));
    board.sync();
    board
}

pub fn board(backend: &MemoryBackend) -> Board<MemoryStore> {
    board_with(backend, BoardConfig::default())
}

/// Drive a committing action to completion and pull in the feed.
pub fn run(board: &mut Board<MemoryStore>, pending: Option<Pending>) {
    let pending = pending.expect("action should issue a write");
    block_on(pending).expect("write should succeed");
    board.sync();
}

/// Press and release the primary button at one screen point.
pub fn click(board: &mut Board<MemoryStore>, at: (f64, f64)) -> Option<Pending> {
    let at = Point::new(at.0, at.1);
    let down = board.pointer_down(PointerId::MOUSE, at, MouseButton::Left);
    let up = board.pointer_up(PointerId::MOUSE, at);
    down.or(up)
}

/// Primary-button drag from one screen point to another.
pub fn drag(board: &mut Board<MemoryStore>, from: (f64, f64), to: (f64, f64)) -> Option<Pending> {
    let from = Point::new(from.0, from.1);
    let to = Point::new(to.0, to.1);
    let down = board.pointer_down(PointerId::MOUSE, from, MouseButton::Left);
    board.pointer_move(PointerId::MOUSE, to, Buttons::LEFT);
    let up = board.pointer_up(PointerId::MOUSE, to);
    down.or(up)
}

pub fn ctrl(key: &str) -> KeyEvent {
    KeyEvent::new(
        key,
        Modifiers {
            ctrl: true,
            ..Modifiers::NONE
        },
    )
}

/// Remote contents of every collection, sorted by key.
pub fn snapshot(backend: &MemoryBackend) -> Vec<(ItemKind, Vec<(ItemId, Fields)>)> {
    ItemKind::ALL
        .iter()
        .map(|kind| {
            let mut items = backend.items(*kind);
            items.sort_by(|a, b| a.0.cmp(&b.0));
            (*kind, items)
        })
        .collect()
}

/// Codec that fakes compression: output keeps the fitted size and a tiny PNG payload.
pub struct StubCodec;

impl ImageCodec for StubCodec {
    fn compress(
        &self,
        image: RawImage,
        max_dimension: u32,
    ) -> BoxFuture<'static, Result<EncodedImage, CodecError>> {
        Box::pin(async move {
            if image.width == 0 || image.height == 0 {
                return Err(CodecError::Unsupported("empty image".into()));
            }
            let (width, height) = fit_within(image.width, image.height, max_dimension);
            Ok(EncodedImage {
                payload: DataUrl::encode(ImageFormat::Png, &[0x89, 0x50, 0x4E, 0x47]),
                width,
                height,
            })
        })
    }

    fn decode(&self, payload: String) -> BoxFuture<'static, Result<DecodedImage, CodecError>> {
        Box::pin(async move {
            match DataUrl::parse(&payload).and_then(|url| url.format()) {
                Some(ImageFormat::Png) => Ok(DecodedImage {
                    width: 1,
                    height: 1,
                    pixels: vec![0, 0, 0, 255],
                }),
                _ => Err(CodecError::Decode("not a PNG data URL".into())),
            }
        })
    }
}

pub fn raw_image(width: u32, height: u32) -> RawImage {
    RawImage {
        width,
        height,
        pixels: vec![255; (width * height * 4) as usize],
    }
}
