//! The board: one client's view of a shared whiteboard.
//!
//! [`Board`] owns the local scene, viewport, tools and per-pointer
//! gestures. Committing actions return a [`Pending`] future that performs
//! the remote write and records the command; the future does not borrow
//! the board, so input keeps flowing while it runs. Everything a finished
//! future needs to tell the board comes back through an outcome queue that
//! [`Board::sync`] drains together with the store feed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use futures_util::future::{join_all, try_join_all};
use kurbo::{Point, Rect, Size, Vec2};
use serde_json::Value;
use thiserror::Error;

use crate::config::{BoardConfig, ConfigError};
use crate::gesture::{DragLimits, DragState, Gesture, Preview};
use crate::history::{Command, CommandLog, History};
use crate::input::{Buttons, ClickTracker, KeyEvent, MouseButton, PointerEvent, PointerId};
use crate::items::{
    ApproxTextMeasure, BlendMode, BoardItem, Connector, Fields, Image, Item, ItemId, ItemKind, Note,
    SerializableColor, Selection, Shape, Stroke, TextMeasure,
};
use crate::media::{CodecError, DecodeCache, DecodedImage, ImageCodec, RawImage};
use crate::mirror::{MirrorChange, reconcile};
use crate::picker::{self, DragMode, Tolerance};
use crate::scene::Scene;
use crate::store::{BoxFuture, RemoteStore, StoreError};
use crate::tools::{ShortcutAction, ShortcutRegistry, ToolController, ToolEffect, ToolKind, ToolStyle};
use crate::viewport::Viewport;

// Use web_time for WASM compatibility
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Text of a freshly created sticky note.
const NEW_STICKY_TEXT: &str = "New sticky";

/// Board errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoardError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Invalid input: {0}")]
    Invalid(String),
    #[error("Image codec error: {0}")]
    Codec(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Clearing the board was denied")]
    ClearDenied,
}

impl From<CodecError> for BoardError {
    fn from(err: CodecError) -> Self {
        BoardError::Codec(err.to_string())
    }
}

impl From<ConfigError> for BoardError {
    fn from(err: ConfigError) -> Self {
        BoardError::Config(err.to_string())
    }
}

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// A committing action in flight. Drive it on the host's executor.
pub type Pending = BoxFuture<'static, BoardResult<()>>;

/// Values the style controls should show.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspector {
    pub stroke: SerializableColor,
    pub fill: SerializableColor,
    pub width: f64,
    pub opacity: f64,
}

/// What one [`Board::sync`] call did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Feed events that changed the scene
    pub changes: Vec<MirrorChange>,
    /// Remote writes that failed since the last sync
    pub failures: Vec<StoreError>,
}

/// Result of finished async work, applied on the next sync.
#[derive(Debug)]
enum Outcome {
    Select(Selection),
    Failed(StoreError),
    Notify(String),
    BoardCleared,
    Decoded {
        id: ItemId,
        ticket: u64,
        result: Result<DecodedImage, CodecError>,
    },
    PresenceJoined(ItemId),
}

/// Shared handles a [`Pending`] future owns, so it never borrows the board.
struct Committer<S> {
    store: Rc<S>,
    history: Rc<CommandLog>,
    outcomes: Rc<RefCell<Vec<Outcome>>>,
}

impl<S: RemoteStore + 'static> Committer<S> {
    fn report(&self, outcome: Outcome) {
        self.outcomes.borrow_mut().push(outcome);
    }

    fn failed(&self, err: StoreError) -> BoardError {
        self.report(Outcome::Failed(err.clone()));
        err.into()
    }

    /// Perform a command's forward write, then record it.
    async fn commit(self, command: Command, select: bool) -> BoardResult<()> {
        let target = command.target();
        if let Err(e) = command
            .redo_effect()
            .apply(&*self.store, command.kind, &command.id)
            .await
        {
            log::warn!("Write to {} {} failed: {e}", command.kind, command.id);
            return Err(self.failed(e));
        }
        self.history.record(command).await;
        if select {
            self.report(Outcome::Select(target));
        }
        Ok(())
    }

    fn after_replay(
        &self,
        result: Result<Option<Command>, StoreError>,
        leaves_item: fn(&Command) -> bool,
    ) -> BoardResult<()> {
        match result {
            Ok(Some(command)) => {
                if leaves_item(&command) {
                    self.report(Outcome::Select(command.target()));
                }
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                log::warn!("History replay failed: {e}");
                Err(self.failed(e))
            }
        }
    }
}

/// One client's whiteboard session.
pub struct Board<S: RemoteStore + 'static> {
    config: BoardConfig,
    store: Rc<S>,
    scene: Scene,
    viewport: Viewport,
    tools: ToolController,
    selection: Option<Selection>,
    /// Selection to apply once the item shows up in the scene
    awaiting_selection: Option<Selection>,
    gestures: HashMap<PointerId, Gesture>,
    history: Rc<CommandLog>,
    outcomes: Rc<RefCell<Vec<Outcome>>>,
    effects: Vec<ToolEffect>,
    measure: Box<dyn TextMeasure>,
    codec: Option<Rc<dyn ImageCodec>>,
    images: DecodeCache,
    presence: Option<ItemId>,
    user_count: usize,
    last_click: Point,
    clicks: ClickTracker,
    redraw: bool,
}

impl<S: RemoteStore + 'static> Board<S> {
    /// Start a session. Fails when `config` does not validate.
    pub fn new(config: BoardConfig, store: S) -> BoardResult<Self> {
        config.validate()?;
        let tools = ToolController::new(
            config.highlighter_max_opacity,
            config.secret_click_count,
            Duration::from_millis(config.secret_click_window_ms),
        );
        Ok(Self {
            viewport: Viewport::new(&config),
            history: Rc::new(CommandLog::new(config.history_capacity)),
            store: Rc::new(store),
            scene: Scene::new(),
            tools,
            selection: None,
            awaiting_selection: None,
            gestures: HashMap::new(),
            outcomes: Rc::new(RefCell::new(Vec::new())),
            effects: Vec::new(),
            measure: Box::new(ApproxTextMeasure),
            codec: None,
            images: DecodeCache::new(),
            presence: None,
            user_count: 0,
            last_click: Point::new(200.0, 200.0),
            clicks: ClickTracker::new(),
            redraw: true,
            config,
        })
    }

    /// Use the renderer's text metrics for note bounds.
    pub fn with_text_measure(mut self, measure: Box<dyn TextMeasure>) -> Self {
        self.measure = measure;
        self
    }

    pub fn with_codec(mut self, codec: Rc<dyn ImageCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    fn committer(&self) -> Committer<S> {
        Committer {
            store: Rc::clone(&self.store),
            history: Rc::clone(&self.history),
            outcomes: Rc::clone(&self.outcomes),
        }
    }

    fn issue(&mut self, command: Command, select: bool) -> Pending {
        self.redraw = true;
        Box::pin(self.committer().commit(command, select))
    }

    /// Register this client's presence entry.
    pub fn connect(&mut self) -> Pending {
        let committer = self.committer();
        Box::pin(async move {
            match committer.store.join_presence().await {
                Ok(key) => {
                    committer.report(Outcome::PresenceJoined(key));
                    Ok(())
                }
                Err(e) => Err(committer.failed(e)),
            }
        })
    }

    // --- Readouts ---

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current()
    }

    pub fn style(&self) -> &ToolStyle {
        &self.tools.style
    }

    pub fn user_count(&self) -> usize {
        self.user_count
    }

    pub fn presence_key(&self) -> Option<&ItemId> {
        self.presence.as_ref()
    }

    pub fn zoom_label(&self) -> String {
        self.viewport.zoom_label()
    }

    /// World point of the last primary press, the default image drop spot.
    pub fn last_click(&self) -> Point {
        self.last_click
    }

    /// History stacks, or `None` while an undo/redo is in flight.
    pub fn history(&self) -> Option<History> {
        self.history.try_snapshot()
    }

    /// Consume the redraw flag.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    /// Drain the requests for the host UI.
    pub fn take_effects(&mut self) -> Vec<ToolEffect> {
        std::mem::take(&mut self.effects)
    }

    /// Overlays for every running gesture.
    pub fn previews(&self) -> Vec<Preview> {
        self.gestures.values().filter_map(Gesture::preview).collect()
    }

    /// Bounding box of the selection as drawn.
    pub fn selection_bounds(&self) -> Option<Rect> {
        let target = self.selection.as_ref()?;
        self.scene.bounds(target, &*self.measure)
    }

    /// Handle points of the selection: the resize corner, or both
    /// connector endpoints. Strokes have none.
    pub fn selection_handles(&self) -> Vec<Point> {
        self.selection
            .as_ref()
            .and_then(|target| self.scene.resolve(target))
            .map(|item| item.handles(&*self.measure))
            .unwrap_or_default()
    }

    /// Style controls, overridden by the selected item where it has the
    /// attribute.
    pub fn inspector(&self) -> Inspector {
        let style = &self.tools.style;
        let mut out = Inspector {
            stroke: style.stroke,
            fill: style.fill,
            width: style.width,
            opacity: style.opacity,
        };
        let Some(item) = self.selection.as_ref().and_then(|t| self.scene.get(t)) else {
            return out;
        };
        match item {
            Item::Shape(shape) => {
                out.stroke = shape.stroke;
                out.width = shape.width;
                out.fill = shape.fill.unwrap_or(style.fill);
                out.opacity = shape.opacity;
            }
            Item::Connector(connector) => {
                out.stroke = connector.stroke;
                out.width = connector.width;
                out.opacity = connector.opacity;
            }
            Item::Stroke(stroke) => {
                out.stroke = stroke.color;
                out.width = stroke.width;
                out.opacity = stroke.opacity;
            }
            Item::Note(note) => {
                out.fill = note.bg.unwrap_or(style.fill);
                out.opacity = note.opacity;
            }
            Item::Image(_) => {}
        }
        out
    }

    /// Decoded pixels for an image item, if ready.
    pub fn decoded_image(&self, id: &ItemId) -> Option<Rc<DecodedImage>> {
        self.images.get(id)
    }

    // --- Feed and outcomes ---

    /// Apply store feed events and finished async work.
    pub fn sync(&mut self) -> SyncReport {
        let mut report = SyncReport::default();

        for event in self.store.poll_events() {
            let change = reconcile(&mut self.scene, &mut self.images, event);
            match &change {
                MirrorChange::Added(target) => {
                    if self.awaiting_selection.as_ref() == Some(target) {
                        self.selection = self.awaiting_selection.take();
                    }
                }
                MirrorChange::Removed(target) => {
                    if self.selection.as_ref() == Some(target) {
                        log::debug!("Selected {} {} was removed", target.kind, target.id);
                        self.selection = None;
                    }
                    if self.awaiting_selection.as_ref() == Some(target) {
                        self.awaiting_selection = None;
                    }
                    self.drop_drags_of(target);
                }
                MirrorChange::Presence(count) => {
                    if *count != self.user_count {
                        log::info!("{count} user(s) online");
                    }
                    self.user_count = *count;
                    self.redraw = true;
                }
                MirrorChange::Changed(_) | MirrorChange::Ignored => {}
            }
            if change.is_visible() {
                self.redraw = true;
                report.changes.push(change);
            }
        }

        let outcomes = std::mem::take(&mut *self.outcomes.borrow_mut());
        if !outcomes.is_empty() {
            self.redraw = true;
        }
        for outcome in outcomes {
            match outcome {
                Outcome::Select(target) => {
                    if self.scene.contains(&target) {
                        self.selection = Some(target);
                        self.awaiting_selection = None;
                    } else {
                        self.awaiting_selection = Some(target);
                    }
                }
                Outcome::Failed(err) => report.failures.push(err),
                Outcome::Notify(message) => self.effects.push(ToolEffect::Notify(message)),
                Outcome::BoardCleared => self.reset_local(),
                Outcome::Decoded { id, ticket, result } => match result {
                    Ok(image) => {
                        if self.images.complete(&id, ticket, image) {
                            self.redraw = true;
                        }
                    }
                    Err(e) => {
                        log::warn!("Failed to decode image {id}: {e}");
                        self.images.fail(&id, ticket);
                    }
                },
                Outcome::PresenceJoined(key) => {
                    log::info!("Joined board {} as {key}", self.config.board_id);
                    self.presence = Some(key);
                }
            }
        }
        report
    }

    /// Content goes away through the feed's removal events; only local
    /// session state is reset here.
    fn reset_local(&mut self) {
        log::info!("Board cleared");
        self.images.clear();
        let pointers: Vec<PointerId> = self.gestures.keys().copied().collect();
        for pointer in pointers {
            self.end_gesture(pointer);
        }
        self.selection = None;
        self.awaiting_selection = None;
        self.effects
            .push(ToolEffect::Notify("Board cleared for everyone.".to_string()));
        self.redraw = true;
    }

    /// Start decoding every image that has no cache entry yet.
    ///
    /// Returns `None` when there is nothing to decode or no codec.
    pub fn decode_pending_images(&mut self) -> Option<BoxFuture<'static, ()>> {
        let codec = self.codec.clone()?;
        let mut jobs = Vec::new();
        for entry in self.scene.images.iter() {
            let Some(ticket) = self.images.begin(&entry.id) else {
                continue;
            };
            let decode = codec.decode(entry.item.data.clone());
            let id = entry.id.clone();
            let outcomes = Rc::clone(&self.outcomes);
            jobs.push(async move {
                let result = decode.await;
                outcomes
                    .borrow_mut()
                    .push(Outcome::Decoded { id, ticket, result });
            });
        }
        if jobs.is_empty() {
            return None;
        }
        Some(Box::pin(async move {
            join_all(jobs).await;
        }))
    }

    // --- Viewport ---

    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport.set_size(size);
        self.redraw = true;
    }

    /// Zoom around the pointer.
    pub fn wheel(&mut self, position: Point, delta: f64) {
        if self.viewport.zoom_at(position, delta) {
            self.redraw = true;
        }
    }

    // --- Pointer input ---

    /// Dispatch a pointer event.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<Pending> {
        match event {
            PointerEvent::Down {
                pointer,
                position,
                button,
            } => self.pointer_down(pointer, position, button),
            PointerEvent::Move {
                pointer,
                position,
                buttons,
            } => {
                self.pointer_move(pointer, position, buttons);
                None
            }
            PointerEvent::Up { pointer, position } => self.pointer_up(pointer, position),
            PointerEvent::Cancel { pointer } => {
                self.pointer_cancel(pointer);
                None
            }
            PointerEvent::Leave { pointer, buttons } => {
                self.pointer_leave(pointer, buttons);
                None
            }
            PointerEvent::Wheel { position, delta } => {
                self.wheel(position, delta);
                None
            }
        }
    }

    fn tolerance(&self) -> Tolerance {
        Tolerance::at_scale(&self.config, self.viewport.scale)
    }

    fn drag_limits(&self) -> DragLimits {
        DragLimits {
            world: self.config.world,
            min_resize: self.config.min_resize,
            endpoint_tolerance: self.tolerance().connector,
        }
    }

    /// End every drag whose target has left the scene.
    fn drop_drags_of(&mut self, target: &Selection) {
        let pointers: Vec<PointerId> = self
            .gestures
            .iter()
            .filter(|(_, gesture)| matches!(gesture, Gesture::Dragging(drag) if &drag.target == target))
            .map(|(pointer, _)| *pointer)
            .collect();
        for pointer in pointers {
            log::debug!("Pointer {} lost its drag target {}", pointer.0, target.id);
            self.end_gesture(pointer);
        }
    }

    fn begin(&mut self, pointer: PointerId, gesture: Gesture) {
        log::debug!("Pointer {} begins {}", pointer.0, gesture.name());
        self.end_gesture(pointer);
        self.gestures.insert(pointer, gesture);
        self.redraw = true;
    }

    /// Remove a pointer's gesture and any override it installed.
    fn end_gesture(&mut self, pointer: PointerId) -> Option<Gesture> {
        let gesture = self.gestures.remove(&pointer)?;
        if let Gesture::Dragging(drag) = &gesture {
            self.scene.clear_override(drag.target.kind, &drag.target.id);
        }
        self.redraw = true;
        Some(gesture)
    }

    pub fn pointer_down(&mut self, pointer: PointerId, position: Point, button: MouseButton) -> Option<Pending> {
        match button {
            MouseButton::Right => {
                self.begin(
                    pointer,
                    Gesture::Panning {
                        start: position,
                        origin: self.viewport.offset,
                        button,
                    },
                );
                return None;
            }
            MouseButton::Middle => return None,
            MouseButton::Left => {}
        }

        let world = self.viewport.screen_to_world(position);
        self.last_click = world;
        if self.clicks.register(position, Instant::now()) {
            self.double_click(position);
        }

        match self.tools.current() {
            ToolKind::Pan => self.begin(
                pointer,
                Gesture::Panning {
                    start: position,
                    origin: self.viewport.offset,
                    button,
                },
            ),
            tool @ (ToolKind::Draw | ToolKind::Highlighter) => self.begin(
                pointer,
                Gesture::Drawing {
                    path: vec![world],
                    highlighter: tool == ToolKind::Highlighter,
                },
            ),
            ToolKind::Erase => self.begin(pointer, Gesture::Erasing { point: world }),
            ToolKind::Text => self.effects.push(ToolEffect::RequestText { at: world }),
            ToolKind::Sticky => {
                let note = Note::sticky(world, NEW_STICKY_TEXT, self.tools.style.fill);
                let pending = self.create(note, true);
                self.tools.set_tool(ToolKind::Select);
                return Some(pending);
            }
            tool @ (ToolKind::Rect | ToolKind::Ellipse | ToolKind::Line | ToolKind::Arrow) => {
                let gesture = match (tool.shape_type(), tool.connector_arrow()) {
                    (Some(shape_type), _) => Gesture::CreatingShape {
                        shape_type,
                        start: world,
                        current: world,
                    },
                    (None, arrow) => Gesture::CreatingConnector {
                        arrow: arrow.unwrap_or(false),
                        start: world,
                        current: world,
                    },
                };
                self.begin(pointer, gesture);
            }
            ToolKind::Image => {}
            ToolKind::Select => self.pick_at(pointer, world),
        }
        None
    }

    fn pick_at(&mut self, pointer: PointerId, world: Point) {
        let hit = picker::pick(&self.scene, world, self.tolerance(), &*self.measure);
        let Some(hit) = hit else {
            self.selection = None;
            self.redraw = true;
            return;
        };
        self.selection = Some(hit.target.clone());
        let Some(original) = self.scene.get(&hit.target) else {
            return;
        };
        let mode = match hit.target.kind {
            ItemKind::Connector if self.config.auto_steer_connectors => DragMode::Auto,
            _ => hit.mode,
        };
        self.begin(
            pointer,
            Gesture::Dragging(DragState::begin(hit.target, mode, world, original)),
        );
    }

    pub fn pointer_move(&mut self, pointer: PointerId, position: Point, buttons: Buttons) {
        let world = self.viewport.screen_to_world(position);
        let limits = self.drag_limits();
        let Some(gesture) = self.gestures.get_mut(&pointer) else {
            return;
        };
        match gesture {
            Gesture::Panning {
                start,
                origin,
                button,
            } => {
                if !buttons.contains(*button) {
                    self.gestures.remove(&pointer);
                    log::debug!("Pointer {} pan ended without button", pointer.0);
                    return;
                }
                self.viewport.pan_from(*origin, position - *start);
            }
            Gesture::Drawing { path, .. } => path.push(world),
            Gesture::Erasing { point } => *point = world,
            Gesture::CreatingShape { current, .. } | Gesture::CreatingConnector { current, .. } => {
                *current = world
            }
            Gesture::Dragging(drag) => {
                if !self.scene.contains(&drag.target) {
                    self.gestures.remove(&pointer);
                    return;
                }
                let live = drag.update(world, &limits).clone();
                self.scene.set_override(drag.target.clone(), live);
            }
        }
        self.redraw = true;
    }

    pub fn pointer_up(&mut self, pointer: PointerId, position: Point) -> Option<Pending> {
        let world = self.viewport.screen_to_world(position);
        let gesture = self.end_gesture(pointer)?;
        log::debug!("Pointer {} commits {}", pointer.0, gesture.name());
        match gesture {
            Gesture::Panning { .. } => None,
            Gesture::Drawing { path, highlighter } => {
                let style = &self.tools.style;
                let mode = if highlighter {
                    BlendMode::Multiply
                } else {
                    BlendMode::Normal
                };
                let stroke = Stroke::from_path(
                    &path,
                    self.config.quantize_step,
                    self.config.simplify_epsilon,
                    style.stroke,
                    style.width,
                    style.opacity,
                    mode,
                );
                match stroke {
                    Some(stroke) => Some(self.create(stroke, false)),
                    None => {
                        log::debug!("Dropping stroke with a single point");
                        None
                    }
                }
            }
            Gesture::Erasing { .. } => {
                let id = picker::stroke_at(&self.scene, world, self.tolerance().item)?.clone();
                let target = Selection::new(ItemKind::Stroke, id);
                let value = self.scene.fields(&target)?;
                Some(self.issue(Command::delete(target.kind, target.id, value), false))
            }
            Gesture::CreatingShape {
                shape_type,
                start,
                current,
            } => {
                let style = &self.tools.style;
                let shape = Shape {
                    stroke: style.stroke,
                    fill: Some(style.fill),
                    opacity: style.opacity,
                    width: style.width,
                    ..Shape::from_drag(shape_type, start, current, self.config.min_shape_size)
                };
                Some(self.create(shape, true))
            }
            Gesture::CreatingConnector {
                arrow,
                start,
                current,
            } => {
                if (current - start).hypot() < self.config.min_connector_length {
                    log::warn!("Connector shorter than {} rejected", self.config.min_connector_length);
                    return None;
                }
                let style = &self.tools.style;
                let connector = Connector {
                    stroke: style.stroke,
                    width: style.width,
                    opacity: style.opacity,
                    ..Connector::between(start, current, arrow)
                };
                Some(self.create(connector, true))
            }
            Gesture::Dragging(drag) => {
                if !self.scene.contains(&drag.target) {
                    log::debug!("Drag target {} is gone", drag.target.id);
                    return None;
                }
                let (undo, redo) = drag.changes()?;
                let target = drag.target;
                Some(self.issue(Command::update(target.kind, target.id, undo, redo), false))
            }
        }
    }

    /// Discard the pointer's gesture without committing.
    pub fn pointer_cancel(&mut self, pointer: PointerId) {
        if let Some(gesture) = self.end_gesture(pointer) {
            log::debug!("Pointer {} cancelled {}", pointer.0, gesture.name());
        }
    }

    /// Leaving with buttons held keeps the gesture alive.
    pub fn pointer_leave(&mut self, pointer: PointerId, buttons: Buttons) {
        if buttons.is_empty() {
            self.pointer_cancel(pointer);
        }
    }

    /// Offer the note under `position` (screen space) for text editing.
    pub fn double_click(&mut self, position: Point) {
        let world = self.viewport.screen_to_world(position);
        let Some(id) = picker::note_at(&self.scene, world, &*self.measure) else {
            return;
        };
        if let Some(note) = self.scene.notes.get(id) {
            self.effects.push(ToolEffect::EditNoteText {
                id: id.clone(),
                text: note.text.clone(),
            });
        }
    }

    // --- Keyboard and tools ---

    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<Pending> {
        match ShortcutRegistry::resolve(event, self.selection.is_some())? {
            ShortcutAction::SetTool(tool) => {
                self.set_tool(tool);
                None
            }
            ShortcutAction::Undo => Some(self.undo()),
            ShortcutAction::Redo => Some(self.redo()),
            ShortcutAction::Duplicate => self.duplicate_selection(),
            ShortcutAction::Delete => self.delete_selection(),
        }
    }

    /// Switch tools, discarding any gesture in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        let pointers: Vec<PointerId> = self.gestures.keys().copied().collect();
        for pointer in pointers {
            self.end_gesture(pointer);
        }
        if let Some(effect) = self.tools.set_tool(tool) {
            self.effects.push(effect);
        }
        self.redraw = true;
    }

    /// A click on a toolbar tool button.
    pub fn press_tool_button(&mut self, tool: ToolKind) {
        self.press_tool_button_at(tool, Instant::now());
    }

    pub fn press_tool_button_at(&mut self, tool: ToolKind, now: Instant) {
        if tool == ToolKind::Erase && self.tools.track_erase_click(now) {
            self.effects.push(ToolEffect::RequestClearPassword);
        }
        self.set_tool(tool);
    }

    // --- Item actions ---

    fn create<T: BoardItem>(&mut self, item: T, select: bool) -> Pending {
        let id = self.store.generate_id(T::KIND);
        self.issue(Command::create(T::KIND, id, item.to_fields()), select)
    }

    /// Place a text note; the answer to [`ToolEffect::RequestText`].
    pub fn place_text(&mut self, at: Point, text: &str) -> BoardResult<Pending> {
        if text.trim().is_empty() {
            log::warn!("Empty note text rejected");
            return Err(BoardError::Invalid("note text is empty".into()));
        }
        let note = Note::text(at, text, self.tools.style.stroke);
        let pending = self.create(note, true);
        self.tools.set_tool(ToolKind::Select);
        Ok(pending)
    }

    /// Replace a note's text. `Ok(None)` if the note is gone or unchanged.
    pub fn edit_note_text(&mut self, id: &ItemId, text: &str) -> BoardResult<Option<Pending>> {
        if text.trim().is_empty() {
            log::warn!("Empty note text rejected");
            return Err(BoardError::Invalid("note text is empty".into()));
        }
        let target = Selection::new(ItemKind::Note, id.clone());
        Ok(self.update_field(&target, "text", Value::String(text.to_string())))
    }

    /// Compress and place an image with its top-left at `at`.
    pub fn place_image(&mut self, image: RawImage, at: Point) -> BoardResult<Pending> {
        let codec = self
            .codec
            .clone()
            .ok_or_else(|| BoardError::Codec("no image codec configured".into()))?;
        let compress = codec.compress(image, self.config.image_max_dimension);
        let world = self.config.world;
        let id = self.store.generate_id(ItemKind::Image);
        let committer = self.committer();
        Ok(Box::pin(async move {
            let encoded = compress.await.map_err(|e| {
                log::warn!("Image compression failed: {e}");
                BoardError::from(e)
            })?;
            let placed = Image::placed(
                at,
                encoded.payload,
                encoded.width as f64,
                encoded.height as f64,
                &world,
            );
            let command = Command::create(ItemKind::Image, id, placed.to_fields());
            committer.commit(command, true).await
        }))
    }

    /// Write one field of an item with a command. `None` if the item is
    /// missing or already has the value.
    fn update_field(&mut self, target: &Selection, key: &str, value: Value) -> Option<Pending> {
        let fields = self.scene.fields(target)?;
        let before = fields.get(key).cloned().unwrap_or(Value::Null);
        if before == value {
            return None;
        }
        let mut undo = Fields::new();
        undo.insert(key.to_string(), before);
        let mut redo = Fields::new();
        redo.insert(key.to_string(), value);
        Some(self.issue(Command::update(target.kind, target.id.clone(), undo, redo), false))
    }

    fn update_selected(&mut self, key_for: impl Fn(ItemKind) -> Option<&'static str>, value: Value) -> Option<Pending> {
        let target = self.selection.clone()?;
        let key = key_for(target.kind)?;
        self.update_field(&target, key, value)
    }

    pub fn set_stroke_color(&mut self, color: SerializableColor) -> Option<Pending> {
        self.tools.style.stroke = color;
        self.redraw = true;
        self.update_selected(
            |kind| match kind {
                ItemKind::Shape | ItemKind::Connector => Some("stroke"),
                ItemKind::Stroke => Some("color"),
                _ => None,
            },
            Value::String(color.to_string()),
        )
    }

    pub fn set_fill_color(&mut self, color: SerializableColor) -> Option<Pending> {
        self.tools.style.fill = color;
        self.redraw = true;
        self.update_selected(
            |kind| match kind {
                ItemKind::Shape => Some("fill"),
                ItemKind::Note => Some("bg"),
                _ => None,
            },
            Value::String(color.to_string()),
        )
    }

    /// Sticky swatch: sets the fill and recolors a selected note.
    pub fn apply_swatch(&mut self, color: SerializableColor) -> Option<Pending> {
        self.tools.style.fill = color;
        self.redraw = true;
        self.update_selected(
            |kind| (kind == ItemKind::Note).then_some("bg"),
            Value::String(color.to_string()),
        )
    }

    pub fn set_width(&mut self, width: f64) -> Option<Pending> {
        let width = ToolStyle::normalize_width(width);
        self.tools.style.width = width;
        self.redraw = true;
        self.update_selected(
            |kind| match kind {
                ItemKind::Shape | ItemKind::Connector | ItemKind::Stroke => Some("width"),
                _ => None,
            },
            Value::from(width),
        )
    }

    pub fn set_opacity(&mut self, opacity: f64) -> Option<Pending> {
        let opacity = ToolStyle::normalize_opacity(opacity);
        self.tools.style.opacity = opacity;
        self.redraw = true;
        self.update_selected(
            |kind| (kind != ItemKind::Image).then_some("opacity"),
            Value::from(opacity),
        )
    }

    /// Clone the selection under a new key, offset diagonally, and select
    /// the clone.
    pub fn duplicate_selection(&mut self) -> Option<Pending> {
        let target = self.selection.clone()?;
        let item = self.scene.get(&target)?;
        let offset = self.config.duplicate_offset;
        let clone = item.translated(Vec2::new(offset, offset), &self.config.world);
        let id = self.store.generate_id(target.kind);
        Some(self.issue(Command::create(target.kind, id, clone.to_fields()), true))
    }

    /// Delete the selection, keeping a full snapshot for undo.
    pub fn delete_selection(&mut self) -> Option<Pending> {
        let target = self.selection.clone()?;
        let value = self.scene.fields(&target)?;
        self.selection = None;
        Some(self.issue(Command::delete(target.kind, target.id, value), false))
    }

    /// Revert the latest command. A restored item is selected.
    pub fn undo(&mut self) -> Pending {
        self.redraw = true;
        let committer = self.committer();
        Box::pin(async move {
            let result = committer.history.undo(&*committer.store).await;
            committer.after_replay(result, |c| c.undo_effect().leaves_item())
        })
    }

    /// Re-apply the latest undone command.
    pub fn redo(&mut self) -> Pending {
        self.redraw = true;
        let committer = self.committer();
        Box::pin(async move {
            let result = committer.history.redo(&*committer.store).await;
            committer.after_replay(result, |c| c.redo_effect().leaves_item())
        })
    }

    /// Remove every item for everyone; the answer to
    /// [`ToolEffect::RequestClearPassword`].
    pub fn request_clear(&mut self, password: &str) -> BoardResult<Pending> {
        match &self.config.clear_password {
            Some(expected) if expected == password => {}
            _ => {
                log::warn!("Bulk clear refused");
                self.effects
                    .push(ToolEffect::Notify("Incorrect password.".to_string()));
                return Err(BoardError::ClearDenied);
            }
        }
        let committer = self.committer();
        Ok(Box::pin(async move {
            let removals = ItemKind::ALL
                .iter()
                .map(|kind| committer.store.remove_all(*kind));
            if let Err(e) = try_join_all(removals).await {
                log::error!("Failed to clear board: {e}");
                committer.report(Outcome::Notify("Failed to clear board.".to_string()));
                return Err(committer.failed(e));
            }
            committer.history.clear().await;
            committer.report(Outcome::BoardCleared);
            Ok(())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    fn board() -> Board<crate::store::MemoryStore> {
        Board::new(BoardConfig::default(), MemoryBackend::new().connect()).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = BoardConfig {
            min_scale: 0.0,
            ..BoardConfig::default()
        };
        let result = Board::new(config, MemoryBackend::new().connect());
        assert!(matches!(result, Err(BoardError::Config(_))));
    }

    #[test]
    fn test_inspector_defaults_to_tool_style() {
        let board = board();
        let inspector = board.inspector();
        assert_eq!(inspector.stroke, board.style().stroke);
        assert_eq!(inspector.fill, board.style().fill);
        assert!((inspector.width - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_width_and_opacity_are_normalized() {
        let mut board = board();
        assert!(board.set_width(0.3).is_none());
        assert!((board.style().width - 1.0).abs() < f64::EPSILON);
        assert!(board.set_opacity(-2.0).is_none());
        assert!(board.style().opacity.abs() < f64::EPSILON);
    }

    #[test]
    fn test_image_tool_requests_file() {
        let mut board = board();
        board.set_tool(ToolKind::Image);
        assert_eq!(board.take_effects(), vec![ToolEffect::RequestImageFile]);
        assert!(board.take_effects().is_empty());
    }

    #[test]
    fn test_middle_button_is_ignored() {
        let mut board = board();
        let pending = board.pointer_down(PointerId::MOUSE, Point::new(10.0, 10.0), MouseButton::Middle);
        assert!(pending.is_none());
        assert!(board.previews().is_empty());
    }

    #[test]
    fn test_error_display() {
        let err = BoardError::from(StoreError::Offline);
        assert_eq!(err.to_string(), "Store error: Store is offline");
        let err = BoardError::from(CodecError::Decode("bad".into()));
        assert_eq!(err, BoardError::Codec("Decode failed: bad".into()));
    }
}
