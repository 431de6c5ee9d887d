//! Undo/redo command log.
//!
//! A command records one remote write as structured data: which item, and
//! the field maps needed to apply it forward or backward. Applying a
//! command only talks to the store; the scene catches up through the feed
//! like it does for any other client's edits.

use futures_util::lock::Mutex;
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_HISTORY_CAPACITY;
use crate::items::{Fields, ItemId, ItemKind, Selection};
use crate::store::{RemoteStore, StoreResult};

/// What a command did to its item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum CommandOp {
    /// The item was created with `value`.
    Create { value: Fields },
    /// The listed fields changed from `before` to `after`.
    Update { before: Fields, after: Fields },
    /// The item was deleted; `value` is its last snapshot.
    Delete { value: Fields },
}

/// One remote write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    Set(Fields),
    Update(Fields),
    Remove,
}

impl Effect {
    /// Issue this write against the store.
    pub async fn apply<S: RemoteStore + ?Sized>(
        &self,
        store: &S,
        kind: ItemKind,
        id: &ItemId,
    ) -> StoreResult<()> {
        match self {
            Effect::Set(value) => store.set(kind, id, value.clone()).await,
            Effect::Update(fields) => store.update(kind, id, fields.clone()).await,
            Effect::Remove => store.remove(kind, id).await,
        }
    }

    /// Whether the item exists after this write.
    pub fn leaves_item(&self) -> bool {
        !matches!(self, Effect::Remove)
    }
}

/// A reversible committed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub kind: ItemKind,
    pub id: ItemId,
    #[serde(flatten)]
    pub op: CommandOp,
}

impl Command {
    pub fn create(kind: ItemKind, id: ItemId, value: Fields) -> Self {
        Self {
            kind,
            id,
            op: CommandOp::Create { value },
        }
    }

    pub fn update(kind: ItemKind, id: ItemId, before: Fields, after: Fields) -> Self {
        Self {
            kind,
            id,
            op: CommandOp::Update { before, after },
        }
    }

    pub fn delete(kind: ItemKind, id: ItemId, value: Fields) -> Self {
        Self {
            kind,
            id,
            op: CommandOp::Delete { value },
        }
    }

    pub fn target(&self) -> Selection {
        Selection::new(self.kind, self.id.clone())
    }

    /// The write that reverts this command.
    pub fn undo_effect(&self) -> Effect {
        match &self.op {
            CommandOp::Create { .. } => Effect::Remove,
            CommandOp::Update { before, .. } => Effect::Update(before.clone()),
            CommandOp::Delete { value } => Effect::Set(value.clone()),
        }
    }

    /// The write that performs this command. Also used the first time.
    pub fn redo_effect(&self) -> Effect {
        match &self.op {
            CommandOp::Create { value } => Effect::Set(value.clone()),
            CommandOp::Update { after, .. } => Effect::Update(after.clone()),
            CommandOp::Delete { .. } => Effect::Remove,
        }
    }
}

/// Bounded undo and redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    max_depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Push a freshly committed command. Clears redo.
    pub fn record(&mut self, command: Command) {
        self.undo_stack.push(command);
        self.redo_stack.clear();
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// History shared between the board and its in-flight futures.
///
/// The async lock is held across each undo/redo round-trip, so a second
/// request waits for the first to land before it pops anything.
pub struct CommandLog {
    history: Mutex<History>,
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl CommandLog {
    pub fn new(max_depth: usize) -> Self {
        Self {
            history: Mutex::new(History::new(max_depth)),
        }
    }

    /// Record a command whose forward write has completed.
    pub async fn record(&self, command: Command) {
        log::debug!("Recording {} on {} {}", op_name(&command.op), command.kind, command.id);
        self.history.lock().await.record(command);
    }

    /// Revert the most recent command.
    ///
    /// On a store failure the command stays on the undo stack and the error
    /// is returned. `Ok(None)` means there was nothing to undo.
    pub async fn undo<S: RemoteStore + ?Sized>(&self, store: &S) -> StoreResult<Option<Command>> {
        let mut history = self.history.lock().await;
        let Some(command) = history.undo_stack.pop() else {
            return Ok(None);
        };
        log::debug!("Undo {} on {} {}", op_name(&command.op), command.kind, command.id);
        if let Err(e) = command.undo_effect().apply(store, command.kind, &command.id).await {
            history.undo_stack.push(command);
            return Err(e);
        }
        history.redo_stack.push(command.clone());
        Ok(Some(command))
    }

    /// Re-apply the most recently undone command.
    pub async fn redo<S: RemoteStore + ?Sized>(&self, store: &S) -> StoreResult<Option<Command>> {
        let mut history = self.history.lock().await;
        let Some(command) = history.redo_stack.pop() else {
            return Ok(None);
        };
        log::debug!("Redo {} on {} {}", op_name(&command.op), command.kind, command.id);
        if let Err(e) = command.redo_effect().apply(store, command.kind, &command.id).await {
            history.redo_stack.push(command);
            return Err(e);
        }
        history.undo_stack.push(command.clone());
        Ok(Some(command))
    }

    pub async fn clear(&self) {
        self.history.lock().await.clear();
    }

    /// Snapshot of the stacks, or `None` while an undo/redo is in flight.
    pub fn try_snapshot(&self) -> Option<History> {
        self.history.try_lock().map(|history| history.clone())
    }
}

fn op_name(op: &CommandOp) -> &'static str {
    match op {
        CommandOp::Create { .. } => "create",
        CommandOp::Update { .. } => "update",
        CommandOp::Delete { .. } => "delete",
    }
}
