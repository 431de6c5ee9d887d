//! Reconciles the local scene with the store feed.
//!
//! Added entries are appended in arrival order, changed entries are
//! replaced in place and removed entries are spliced out. Every event for
//! an item evicts its decoded image and drops any drag override on it.

use crate::items::{BoardItem, Connector, Fields, Image, ItemId, ItemKind, Note, Selection, Shape, Stroke};
use crate::media::DecodeCache;
use crate::scene::Scene;
use crate::store::StoreEvent;

/// What a feed event did to the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorChange {
    Added(Selection),
    Changed(Selection),
    Removed(Selection),
    Presence(usize),
    /// The event was dropped (undecodable payload or unknown id).
    Ignored,
}

impl MirrorChange {
    /// Whether the scene content changed.
    pub fn is_visible(&self) -> bool {
        matches!(
            self,
            MirrorChange::Added(_) | MirrorChange::Changed(_) | MirrorChange::Removed(_)
        )
    }
}

/// Apply one feed event to the scene.
pub fn reconcile(scene: &mut Scene, images: &mut DecodeCache, event: StoreEvent) -> MirrorChange {
    match event {
        StoreEvent::Added { kind, id, value } => {
            scene.clear_override(kind, &id);
            evict(images, kind, &id);
            on_kind(kind, scene, id, Op::Add(value))
        }
        StoreEvent::Changed { kind, id, value } => {
            scene.clear_override(kind, &id);
            evict(images, kind, &id);
            on_kind(kind, scene, id, Op::Change(value))
        }
        StoreEvent::Removed { kind, id } => {
            scene.clear_override(kind, &id);
            evict(images, kind, &id);
            on_kind(kind, scene, id, Op::Remove)
        }
        StoreEvent::Presence { count } => MirrorChange::Presence(count),
    }
}

enum Op {
    Add(Fields),
    Change(Fields),
    Remove,
}

fn evict(images: &mut DecodeCache, kind: ItemKind, id: &ItemId) {
    if kind == ItemKind::Image {
        images.evict(id);
    }
}

fn on_kind(kind: ItemKind, scene: &mut Scene, id: ItemId, op: Op) -> MirrorChange {
    match kind {
        ItemKind::Stroke => apply::<Stroke>(scene, id, op),
        ItemKind::Note => apply::<Note>(scene, id, op),
        ItemKind::Shape => apply::<Shape>(scene, id, op),
        ItemKind::Connector => apply::<Connector>(scene, id, op),
        ItemKind::Image => apply::<Image>(scene, id, op),
    }
}

fn apply<T: BoardItem>(scene: &mut Scene, id: ItemId, op: Op) -> MirrorChange {
    let collection = T::collection_mut(scene);
    match op {
        Op::Add(value) => match T::from_fields(value) {
            Ok(item) => {
                log::debug!("Feed added {} {id}", T::KIND);
                if !collection.replace(&id, item.clone()) {
                    collection.push(id.clone(), item);
                }
                MirrorChange::Added(Selection::new(T::KIND, id))
            }
            Err(e) => {
                log::warn!("Skipping undecodable {} {id}: {e}", T::KIND);
                MirrorChange::Ignored
            }
        },
        Op::Change(value) => match T::from_fields(value) {
            Ok(item) => {
                log::debug!("Feed changed {} {id}", T::KIND);
                if collection.replace(&id, item) {
                    MirrorChange::Changed(Selection::new(T::KIND, id))
                } else {
                    MirrorChange::Ignored
                }
            }
            Err(e) => {
                // The stale copy is worse than none.
                log::warn!("Dropping {} {id}, changed payload undecodable: {e}", T::KIND);
                match collection.remove(&id) {
                    Some(_) => MirrorChange::Removed(Selection::new(T::KIND, id)),
                    None => MirrorChange::Ignored,
                }
            }
        },
        Op::Remove => {
            log::debug!("Feed removed {} {id}", T::KIND);
            match collection.remove(&id) {
                Some(_) => MirrorChange::Removed(Selection::new(T::KIND, id)),
                None => MirrorChange::Ignored,
            }
        }
    }
}
