//! Single-client board scenarios against the in-memory store.

mod common;

use std::rc::Rc;
use std::time::{Duration, Instant};

use common::{click, ctrl, drag, run};
use inkwall_core::gesture::Preview;
use inkwall_core::items::{BlendMode, NoteKind};
use inkwall_core::store::StoreError;
use inkwall_core::{
    Board, BoardConfig, BoardError, Buttons, ItemKind, KeyEvent, MemoryBackend, MemoryStore,
    MouseButton, Pending, PointerId, Selection, SerializableColor, ToolEffect, ToolKind,
};
use kurbo::Point;
use pollster::block_on;

#[test]
fn test_three_point_stroke_uses_tool_style() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Draw);

    let p = PointerId::MOUSE;
    assert!(board.pointer_down(p, Point::new(0.0, 0.0), MouseButton::Left).is_none());
    board.pointer_move(p, Point::new(10.0, 0.0), Buttons::LEFT);
    board.pointer_move(p, Point::new(10.0, 10.0), Buttons::LEFT);
    let pending = board.pointer_up(p, Point::new(10.0, 10.0));
    run(&mut board, pending);

    let stroke = &board.scene().strokes.iter().next().unwrap().item;
    assert_eq!(stroke.points.first(), Some(&[0, 0]));
    assert_eq!(stroke.points.last(), Some(&[10, 10]));
    assert!(stroke.points.len() <= 3);
    assert_eq!(stroke.color, board.style().stroke);
    assert!((stroke.width - 4.0).abs() < f64::EPSILON);
    assert_eq!(stroke.mode, BlendMode::Normal);
    // Freehand strokes are not selected after drawing.
    assert!(board.selection().is_none());
}

#[test]
fn test_highlighter_multiplies_and_caps_opacity() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Highlighter);
    assert!((board.style().opacity - 0.45).abs() < f64::EPSILON);

    let pending = drag(&mut board, (50.0, 50.0), (150.0, 60.0));
    run(&mut board, pending);

    let stroke = &board.scene().strokes.iter().next().unwrap().item;
    assert_eq!(stroke.mode, BlendMode::Multiply);
    assert!((stroke.opacity - 0.45).abs() < f64::EPSILON);
}

#[test]
fn test_single_point_stroke_is_dropped() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Draw);
    assert!(click(&mut board, (30.0, 30.0)).is_none());
    assert_eq!(backend.len(ItemKind::Stroke), 0);
}

#[test]
fn test_rect_drag_normalizes_and_selects() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Rect);

    let pending = drag(&mut board, (100.0, 100.0), (40.0, 160.0));
    run(&mut board, pending);

    let entry = board.scene().shapes.iter().next().unwrap();
    let shape = &entry.item;
    assert_eq!((shape.x, shape.y, shape.w, shape.h), (40.0, 100.0, 60.0, 60.0));
    assert_eq!(shape.stroke, board.style().stroke);
    assert_eq!(shape.fill, Some(board.style().fill));
    assert_eq!(
        board.selection(),
        Some(&Selection::new(ItemKind::Shape, entry.id.clone()))
    );
}

#[test]
fn test_tiny_rect_is_floored() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Ellipse);

    let pending = drag(&mut board, (100.0, 100.0), (105.0, 103.0));
    run(&mut board, pending);

    let shape = &board.scene().shapes.iter().next().unwrap().item;
    assert_eq!((shape.w, shape.h), (24.0, 24.0));
}

#[test]
fn test_creation_previews() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Arrow);

    let p = PointerId::MOUSE;
    board.pointer_down(p, Point::new(10.0, 10.0), MouseButton::Left);
    board.pointer_move(p, Point::new(90.0, 40.0), Buttons::LEFT);
    assert_eq!(
        board.previews(),
        vec![Preview::Connector {
            a: Point::new(10.0, 10.0),
            b: Point::new(90.0, 40.0),
            arrow: true,
        }]
    );

    // Switching tools discards the gesture.
    board.set_tool(ToolKind::Select);
    assert!(board.previews().is_empty());
    assert!(board.pointer_up(p, Point::new(90.0, 40.0)).is_none());
    assert_eq!(backend.len(ItemKind::Connector), 0);
}

#[test]
fn test_short_connector_is_rejected() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Line);

    assert!(drag(&mut board, (100.0, 100.0), (103.0, 103.0)).is_none());
    assert_eq!(backend.len(ItemKind::Connector), 0);

    let pending = drag(&mut board, (100.0, 100.0), (180.0, 100.0));
    run(&mut board, pending);
    let connector = &board.scene().connectors.iter().next().unwrap().item;
    assert!(!connector.arrow);
    assert_eq!((connector.ax, connector.bx), (100.0, 180.0));
}

#[test]
fn test_image_is_clamped_into_world() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend).with_codec(Rc::new(common::StubCodec));

    let pending = board
        .place_image(common::raw_image(200, 200), Point::new(19990.0, 19990.0))
        .unwrap();
    run(&mut board, Some(pending));

    let entry = board.scene().images.iter().next().unwrap();
    let id = entry.id.clone();
    assert_eq!(
        (entry.item.x, entry.item.y, entry.item.w, entry.item.h),
        (19800.0, 19800.0, 200.0, 200.0)
    );
    assert_eq!(board.selection(), Some(&Selection::new(ItemKind::Image, id.clone())));

    // Decoding is lazy and cached per id.
    assert!(board.decoded_image(&id).is_none());
    let decode = board.decode_pending_images().unwrap();
    block_on(decode);
    board.sync();
    assert!(board.decoded_image(&id).is_some());
    assert!(board.decode_pending_images().is_none());
}

#[test]
fn test_large_image_is_downscaled() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend).with_codec(Rc::new(common::StubCodec));
    let pending = board
        .place_image(common::raw_image(2048, 1024), Point::new(10.0, 10.0))
        .unwrap();
    run(&mut board, Some(pending));
    let image = &board.scene().images.iter().next().unwrap().item;
    assert_eq!((image.w, image.h), (1024.0, 512.0));
}

#[test]
fn test_image_without_codec() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    let result = board.place_image(common::raw_image(4, 4), Point::ZERO);
    assert!(matches!(result, Err(BoardError::Codec(_))));
}

#[test]
fn test_sticky_then_delete_and_undo_reselects() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Sticky);

    let pending = click(&mut board, (300.0, 300.0));
    run(&mut board, pending);
    assert_eq!(board.tool(), ToolKind::Select);

    let entry = board.scene().notes.iter().next().unwrap();
    let note = entry.item.clone();
    let target = Selection::new(ItemKind::Note, entry.id.clone());
    assert_eq!(note.text, "New sticky");
    assert_eq!(note.kind, NoteKind::Sticky);
    assert_eq!(note.bg, Some(board.style().fill));
    assert_eq!(board.selection(), Some(&target));
    let before = backend.get(ItemKind::Note, &target.id).unwrap();

    let pending = board.handle_key(&KeyEvent::plain("Delete"));
    assert!(board.selection().is_none());
    run(&mut board, pending);
    assert!(board.scene().notes.is_empty());

    let pending = board.handle_key(&ctrl("z"));
    run(&mut board, pending);
    assert_eq!(backend.get(ItemKind::Note, &target.id), Some(before));
    assert_eq!(board.selection(), Some(&target));
}

#[test]
fn test_text_note_placement() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Text);

    assert!(click(&mut board, (120.0, 80.0)).is_none());
    let effects = board.take_effects();
    assert_eq!(effects, vec![ToolEffect::RequestText { at: Point::new(120.0, 80.0) }]);

    assert!(matches!(
        board.place_text(Point::new(120.0, 80.0), "   "),
        Err(BoardError::Invalid(_))
    ));

    let pending = board.place_text(Point::new(120.4, 80.6), "hello").unwrap();
    run(&mut board, Some(pending));
    let note = &board.scene().notes.iter().next().unwrap().item;
    assert_eq!((note.x, note.y), (120.0, 81.0));
    assert_eq!(note.color, board.style().stroke);
    assert_eq!(note.bg, None);
    assert_eq!(board.tool(), ToolKind::Select);
}

#[test]
fn test_edit_note_text() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    let pending = board.place_text(Point::new(200.0, 200.0), "draft").unwrap();
    run(&mut board, Some(pending));
    let id = board.scene().notes.iter().next().unwrap().id.clone();

    // Unchanged text issues nothing.
    assert!(board.edit_note_text(&id, "draft").unwrap().is_none());

    let pending = board.edit_note_text(&id, "final").unwrap();
    run(&mut board, pending);
    assert_eq!(board.scene().notes.get(&id).unwrap().text, "final");

    let pending = board.undo();
    run(&mut board, Some(pending));
    assert_eq!(board.scene().notes.get(&id).unwrap().text, "draft");
}

#[test]
fn test_double_click_offers_note_text() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    let pending = board.place_text(Point::new(200.0, 200.0), "draft").unwrap();
    run(&mut board, Some(pending));
    let id = board.scene().notes.iter().next().unwrap().id.clone();
    board.take_effects();

    click(&mut board, (210.0, 210.0));
    click(&mut board, (210.0, 210.0));
    assert!(board.take_effects().contains(&ToolEffect::EditNoteText {
        id,
        text: "draft".to_string(),
    }));
}

#[test]
fn test_style_edits_update_selection() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Rect);
    let pending = drag(&mut board, (100.0, 100.0), (200.0, 200.0));
    run(&mut board, pending);
    let id = board.selection().unwrap().id.clone();

    let red = SerializableColor::new(255, 0, 0, 255);
    let pending = board.set_stroke_color(red);
    run(&mut board, pending);
    assert_eq!(board.scene().shapes.get(&id).unwrap().stroke, red);
    assert_eq!(board.inspector().stroke, red);

    // Same width as the shape already has: nothing to write.
    assert!(board.set_width(4.0).is_none());
    let pending = board.set_width(7.6);
    run(&mut board, pending);
    assert!((board.scene().shapes.get(&id).unwrap().width - 7.0).abs() < f64::EPSILON);

    let pending = board.set_opacity(1.7);
    assert!(pending.is_none());
    let pending = board.set_opacity(0.5);
    run(&mut board, pending);
    assert!((board.inspector().opacity - 0.5).abs() < f64::EPSILON);

    // Swatches only recolor notes.
    assert!(board.apply_swatch(SerializableColor::new(0xfd, 0xe6, 0x8a, 255)).is_none());
    assert_eq!(board.style().fill, SerializableColor::new(0xfd, 0xe6, 0x8a, 255));

    let history = board.history().unwrap();
    assert_eq!(history.undo_len(), 4);
}

#[test]
fn test_stroke_color_edit_writes_color_field() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Draw);
    let pending = drag(&mut board, (10.0, 10.0), (60.0, 10.0));
    run(&mut board, pending);

    board.set_tool(ToolKind::Select);
    assert!(click(&mut board, (30.0, 10.0)).is_none());
    let target = board.selection().cloned().unwrap();
    assert_eq!(target.kind, ItemKind::Stroke);

    let blue = SerializableColor::new(0, 0, 255, 255);
    let pending = board.set_stroke_color(blue);
    run(&mut board, pending);
    let fields = backend.get(ItemKind::Stroke, &target.id).unwrap();
    assert_eq!(fields["color"], serde_json::json!("#0000ff"));
    assert!(board.selection_handles().is_empty());
}

#[test]
fn test_inspector_follows_note_background() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Sticky);
    let pending = click(&mut board, (300.0, 300.0));
    run(&mut board, pending);

    let yellow = SerializableColor::new(0xfd, 0xe6, 0x8a, 255);
    let pending = board.apply_swatch(yellow);
    run(&mut board, pending);
    assert_eq!(board.inspector().fill, yellow);
    let id = board.selection().unwrap().id.clone();
    assert_eq!(board.scene().notes.get(&id).unwrap().bg, Some(yellow));

    // Stroke controls do not apply to notes.
    assert!(board.set_stroke_color(SerializableColor::black()).is_none());
}

#[test]
fn test_duplicate_offsets_and_selects_clone() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Rect);
    let pending = drag(&mut board, (100.0, 100.0), (40.0, 160.0));
    run(&mut board, pending);
    let original = board.selection().cloned().unwrap();

    let pending = board.handle_key(&ctrl("d"));
    run(&mut board, pending);

    assert_eq!(board.scene().shapes.len(), 2);
    let clone = board.selection().cloned().unwrap();
    assert_ne!(clone, original);
    let shape = board.scene().shapes.get(&clone.id).unwrap();
    assert_eq!((shape.x, shape.y, shape.w, shape.h), (72.0, 132.0, 60.0, 60.0));
}

#[test]
fn test_erase_removes_topmost_stroke() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Draw);
    let pending = drag(&mut board, (0.0, 50.0), (100.0, 50.0));
    run(&mut board, pending);
    let pending = drag(&mut board, (50.0, 0.0), (50.0, 100.0));
    run(&mut board, pending);
    let newest = board.scene().strokes.iter().last().unwrap().id.clone();

    board.set_tool(ToolKind::Erase);
    assert_eq!(board.tool(), ToolKind::Erase);
    let pending = click(&mut board, (50.0, 50.0));
    run(&mut board, pending);
    assert_eq!(board.scene().strokes.len(), 1);
    assert!(board.scene().strokes.get(&newest).is_none());

    // Nothing under the eraser: no write.
    assert!(click(&mut board, (500.0, 500.0)).is_none());

    let pending = board.undo();
    run(&mut board, Some(pending));
    assert!(board.scene().strokes.get(&newest).is_some());
}

#[test]
fn test_drag_moves_and_resizes() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Rect);
    let pending = drag(&mut board, (100.0, 100.0), (200.0, 180.0));
    run(&mut board, pending);
    let id = board.selection().unwrap().id.clone();
    board.set_tool(ToolKind::Select);

    let pending = drag(&mut board, (150.0, 140.0), (170.5, 150.0));
    run(&mut board, pending);
    let shape = board.scene().shapes.get(&id).unwrap();
    assert_eq!((shape.x, shape.y), (121.0, 110.0));

    // Grab the bottom-right corner and shrink below the floor.
    let pending = drag(&mut board, (221.0, 190.0), (100.0, 100.0));
    run(&mut board, pending);
    let shape = board.scene().shapes.get(&id).unwrap();
    assert_eq!((shape.x, shape.y, shape.w, shape.h), (121.0, 110.0, 16.0, 16.0));
    assert_eq!(board.selection_handles(), vec![Point::new(137.0, 126.0)]);
}

#[test]
fn test_drag_override_and_cancel() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Rect);
    let pending = drag(&mut board, (100.0, 100.0), (200.0, 200.0));
    run(&mut board, pending);
    let target = board.selection().cloned().unwrap();
    board.set_tool(ToolKind::Select);

    let p = PointerId::MOUSE;
    board.pointer_down(p, Point::new(150.0, 150.0), MouseButton::Left);
    board.pointer_move(p, Point::new(250.0, 250.0), Buttons::LEFT);

    let bounds = board.selection_bounds().unwrap();
    assert_eq!((bounds.x0, bounds.y0), (200.0, 200.0));
    let authoritative = board.scene().shapes.get(&target.id).unwrap();
    assert_eq!(authoritative.x, 100.0);

    // Leaving with the button held keeps the drag.
    board.pointer_leave(p, Buttons::LEFT);
    assert!(board.scene().has_overrides());

    board.pointer_cancel(p);
    assert!(!board.scene().has_overrides());
    assert!(board.pointer_up(p, Point::new(250.0, 250.0)).is_none());
    assert_eq!(
        backend.get(ItemKind::Shape, &target.id).unwrap()["x"],
        serde_json::json!(100.0)
    );
}

#[test]
fn test_connector_endpoint_drag() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Arrow);
    let pending = drag(&mut board, (100.0, 100.0), (300.0, 100.0));
    run(&mut board, pending);
    let id = board.selection().unwrap().id.clone();
    board.set_tool(ToolKind::Select);

    let pending = drag(&mut board, (300.0, 100.0), (300.0, 250.0));
    run(&mut board, pending);
    let connector = board.scene().connectors.get(&id).unwrap();
    assert_eq!((connector.ax, connector.ay), (100.0, 100.0));
    assert_eq!((connector.bx, connector.by), (300.0, 250.0));
    assert_eq!(
        board.selection_handles(),
        vec![Point::new(100.0, 100.0), Point::new(300.0, 250.0)]
    );
}

/// Step the primary pointer from one screen point to another in 5px moves.
fn steer(board: &mut Board<MemoryStore>, from: Point, to: Point) -> Option<Pending> {
    let p = PointerId::MOUSE;
    board.pointer_down(p, from, MouseButton::Left);
    let steps = ((to - from).hypot() / 5.0).ceil() as usize;
    for i in 1..=steps {
        board.pointer_move(p, from.lerp(to, i as f64 / steps as f64), Buttons::LEFT);
    }
    board.pointer_up(p, to)
}

#[test]
fn test_auto_steer_follows_nearest_endpoint() {
    let backend = MemoryBackend::new();
    let config = BoardConfig {
        auto_steer_connectors: true,
        ..BoardConfig::default()
    };
    let mut board = common::board_with(&backend, config);
    board.set_tool(ToolKind::Line);
    let pending = drag(&mut board, (100.0, 100.0), (300.0, 100.0));
    run(&mut board, pending);
    let id = board.selection().unwrap().id.clone();
    board.set_tool(ToolKind::Select);

    // Small steps from the far end keep steering that endpoint.
    let pending = steer(&mut board, Point::new(300.0, 100.0), Point::new(300.0, 150.0));
    run(&mut board, pending);
    let connector = board.scene().connectors.get(&id).unwrap();
    assert_eq!((connector.ax, connector.ay), (100.0, 100.0));
    assert_eq!((connector.bx, connector.by), (300.0, 150.0));

    // Grabbing the body with no endpoint in reach moves the whole line.
    let pending = steer(&mut board, Point::new(200.0, 125.0), Point::new(200.0, 145.0));
    run(&mut board, pending);
    let connector = board.scene().connectors.get(&id).unwrap();
    assert_eq!((connector.ax, connector.ay), (100.0, 120.0));
    assert_eq!((connector.bx, connector.by), (300.0, 170.0));
}

#[test]
fn test_stroke_beats_shape_on_click() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Rect);
    let pending = drag(&mut board, (100.0, 100.0), (300.0, 300.0));
    run(&mut board, pending);
    board.set_tool(ToolKind::Draw);
    let pending = drag(&mut board, (120.0, 200.0), (280.0, 200.0));
    run(&mut board, pending);

    board.set_tool(ToolKind::Select);
    click(&mut board, (200.0, 200.0));
    assert_eq!(board.selection().unwrap().kind, ItemKind::Stroke);

    // Empty space clears the selection.
    click(&mut board, (900.0, 700.0));
    assert!(board.selection().is_none());
}

#[test]
fn test_secret_clear_sequence() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    let t0 = Instant::now();
    for i in 0..4 {
        board.press_tool_button_at(ToolKind::Erase, t0 + Duration::from_millis(i * 200));
    }
    assert!(!board.take_effects().contains(&ToolEffect::RequestClearPassword));
    board.press_tool_button_at(ToolKind::Erase, t0 + Duration::from_millis(900));
    assert_eq!(board.take_effects(), vec![ToolEffect::RequestClearPassword]);
    assert_eq!(board.tool(), ToolKind::Erase);
}

#[test]
fn test_clear_needs_password() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    assert!(matches!(board.request_clear("anything"), Err(BoardError::ClearDenied)));
    assert_eq!(
        board.take_effects(),
        vec![ToolEffect::Notify("Incorrect password.".to_string())]
    );
}

#[test]
fn test_clear_with_password_resets_board() {
    let backend = MemoryBackend::new();
    let config = BoardConfig {
        clear_password: Some("letmein".to_string()),
        ..BoardConfig::default()
    };
    let mut board = common::board_with(&backend, config);
    board.set_tool(ToolKind::Rect);
    let pending = drag(&mut board, (100.0, 100.0), (200.0, 200.0));
    run(&mut board, pending);
    board.set_tool(ToolKind::Draw);
    let pending = drag(&mut board, (10.0, 10.0), (60.0, 10.0));
    run(&mut board, pending);
    board.take_effects();

    assert!(matches!(board.request_clear("nope"), Err(BoardError::ClearDenied)));
    assert_eq!(backend.len(ItemKind::Shape), 1);

    let pending = board.request_clear("letmein").unwrap();
    run(&mut board, Some(pending));
    assert!(board.scene().is_empty());
    assert!(board.selection().is_none());
    assert!(!board.history().unwrap().can_undo());
    assert!(board
        .take_effects()
        .contains(&ToolEffect::Notify("Board cleared for everyone.".to_string())));
}

#[test]
fn test_clear_failure_notifies() {
    let backend = MemoryBackend::new();
    let config = BoardConfig {
        clear_password: Some("letmein".to_string()),
        ..BoardConfig::default()
    };
    let mut board = common::board_with(&backend, config);
    board.take_effects();
    backend.set_offline(true);

    let pending = board.request_clear("letmein").unwrap();
    assert_eq!(
        block_on(pending),
        Err(BoardError::Store(StoreError::Offline))
    );
    let report = board.sync();
    assert_eq!(report.failures, vec![StoreError::Offline]);
    assert_eq!(
        board.take_effects(),
        vec![ToolEffect::Notify("Failed to clear board.".to_string())]
    );
}

#[test]
fn test_failed_write_is_reported_not_recorded() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    board.set_tool(ToolKind::Rect);
    backend.fail_next(1);

    let pending = drag(&mut board, (100.0, 100.0), (200.0, 200.0)).unwrap();
    assert!(matches!(
        block_on(pending),
        Err(BoardError::Store(StoreError::Rejected(_)))
    ));
    let report = board.sync();
    assert_eq!(report.failures.len(), 1);
    assert!(board.scene().shapes.is_empty());
    assert!(!board.history().unwrap().can_undo());
    assert!(board.selection().is_none());
}

#[test]
fn test_right_button_pans() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    let p = PointerId::MOUSE;
    board.pointer_down(p, Point::new(400.0, 400.0), MouseButton::Right);
    board.pointer_move(p, Point::new(300.0, 350.0), Buttons::RIGHT);
    assert_eq!(board.viewport().offset, kurbo::Vec2::new(100.0, 50.0));

    // A move without the button ends the pan.
    board.pointer_move(p, Point::new(200.0, 200.0), Buttons::NONE);
    board.pointer_move(p, Point::new(100.0, 100.0), Buttons::RIGHT);
    assert_eq!(board.viewport().offset, kurbo::Vec2::new(100.0, 50.0));
}

#[test]
fn test_wheel_zoom_label() {
    let backend = MemoryBackend::new();
    let mut board = common::board(&backend);
    assert_eq!(board.zoom_label(), "100%");
    board.wheel(Point::new(640.0, 400.0), -500.0 * 2f64.ln());
    assert_eq!(board.zoom_label(), "200%");
    assert!(board.take_redraw());
    assert!(!board.take_redraw());
}
