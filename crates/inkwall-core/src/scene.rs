//! Scene: the local mirror of the board's five collections.
//!
//! Authoritative content only changes through the store feed (see
//! [`crate::mirror`]). The one exception is a per-item visual override
//! an active drag installs for live feedback; it is dropped when the
//! gesture ends or the feed delivers news about that item.

use kurbo::Rect;

use crate::items::{
    BoardItem, Connector, Fields, Image, Item, ItemId, ItemKind, Note, Selection, Shape, Stroke,
    TextMeasure,
};

/// One keyed entry of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<T> {
    pub id: ItemId,
    pub item: T,
}

/// Items of one kind in arrival order.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    entries: Vec<Entry<T>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: BoardItem> Collection<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn position(&self, id: &ItemId) -> Option<usize> {
        self.entries.iter().position(|e| &e.id == id)
    }

    pub fn get(&self, id: &ItemId) -> Option<&T> {
        self.entries.iter().find(|e| &e.id == id).map(|e| &e.item)
    }

    /// Append in arrival order.
    pub fn push(&mut self, id: ItemId, item: T) {
        self.entries.push(Entry { id, item });
    }

    /// Replace the item with `id` in place. Returns `false` if absent.
    pub fn replace(&mut self, id: &ItemId, item: T) -> bool {
        match self.entries.iter_mut().find(|e| &e.id == id) {
            Some(entry) => {
                entry.item = item;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &ItemId) -> Option<T> {
        let index = self.position(id)?;
        Some(self.entries.remove(index).item)
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Entry<T>> {
        self.entries.iter()
    }

    /// Entries newest first, the order hit testing uses.
    pub fn iter_topmost(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries.iter().rev()
    }
}

/// The five collections plus any live drag overrides.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub strokes: Collection<Stroke>,
    pub notes: Collection<Note>,
    pub shapes: Collection<Shape>,
    pub connectors: Collection<Connector>,
    pub images: Collection<Image>,
    overrides: Vec<(Selection, Item)>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of items across all collections.
    pub fn len(&self) -> usize {
        self.strokes.len() + self.notes.len() + self.shapes.len() + self.connectors.len() + self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, target: &Selection) -> bool {
        match target.kind {
            ItemKind::Stroke => self.strokes.get(&target.id).is_some(),
            ItemKind::Note => self.notes.get(&target.id).is_some(),
            ItemKind::Shape => self.shapes.get(&target.id).is_some(),
            ItemKind::Connector => self.connectors.get(&target.id).is_some(),
            ItemKind::Image => self.images.get(&target.id).is_some(),
        }
    }

    /// Authoritative copy of an item, ignoring overrides.
    pub fn get(&self, target: &Selection) -> Option<Item> {
        fn lookup<T: BoardItem>(scene: &Scene, id: &ItemId) -> Option<Item> {
            T::collection(scene).get(id).cloned().map(T::into_item)
        }
        match target.kind {
            ItemKind::Stroke => lookup::<Stroke>(self, &target.id),
            ItemKind::Note => lookup::<Note>(self, &target.id),
            ItemKind::Shape => lookup::<Shape>(self, &target.id),
            ItemKind::Connector => lookup::<Connector>(self, &target.id),
            ItemKind::Image => lookup::<Image>(self, &target.id),
        }
    }

    /// What should be drawn for an item: its override if any, else the
    /// authoritative copy.
    pub fn resolve(&self, target: &Selection) -> Option<Item> {
        match self.override_for(target.kind, &target.id) {
            Some(item) => Some(item.clone()),
            None => self.get(target),
        }
    }

    /// Field map of an item as stored remotely.
    pub fn fields(&self, target: &Selection) -> Option<Fields> {
        self.get(target).map(|item| item.to_fields())
    }

    pub fn bounds(&self, target: &Selection, measure: &dyn TextMeasure) -> Option<Rect> {
        self.resolve(target).map(|item| item.bounds(measure))
    }

    /// Install a visual override for an item being dragged.
    pub fn set_override(&mut self, target: Selection, item: Item) {
        match self.overrides.iter_mut().find(|(sel, _)| sel == &target) {
            Some(slot) => slot.1 = item,
            None => self.overrides.push((target, item)),
        }
    }

    /// Drop the override for an item. Returns `true` if one existed.
    pub fn clear_override(&mut self, kind: ItemKind, id: &ItemId) -> bool {
        let before = self.overrides.len();
        self.overrides.retain(|(sel, _)| !sel.is(kind, id));
        self.overrides.len() != before
    }

    pub fn override_for(&self, kind: ItemKind, id: &ItemId) -> Option<&Item> {
        self.overrides
            .iter()
            .find(|(sel, _)| sel.is(kind, id))
            .map(|(_, item)| item)
    }

    pub fn has_overrides(&self) -> bool {
        !self.overrides.is_empty()
    }

    /// Items of one kind as they should be drawn, oldest first.
    pub fn visible<'a, T: BoardItem + 'a>(&'a self) -> impl Iterator<Item = (&'a ItemId, &'a T)> + 'a {
        T::collection(self).iter().map(move |entry| {
            let item = self
                .override_for(T::KIND, &entry.id)
                .and_then(T::from_item)
                .unwrap_or(&entry.item);
            (&entry.id, item)
        })
    }
}
