//! In-memory shared store.
//!
//! One [`MemoryBackend`] plays the remote service; each [`MemoryStore`]
//! handle from [`MemoryBackend::connect`] is one client with its own feed.
//! Writes are broadcast to every connected client, the writer included.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::task::{Poll, Waker};

use futures_util::future::poll_fn;
use uuid::Uuid;

use super::{BoxFuture, RemoteStore, StoreError, StoreEvent, StoreResult};
use crate::items::{Fields, ItemId, ItemKind};

struct Client {
    id: u64,
    events: Vec<StoreEvent>,
}

#[derive(Default)]
struct Shared {
    collections: HashMap<ItemKind, Vec<(ItemId, Fields)>>,
    clients: Vec<Client>,
    presence: Vec<(u64, ItemId)>,
    next_key: u64,
    next_client: u64,
    offline: bool,
    fail_next: usize,
    paused: bool,
    waiters: Vec<Waker>,
}

impl Shared {
    fn new_key(&mut self) -> ItemId {
        self.next_key += 1;
        let suffix = Uuid::new_v4().simple().to_string();
        ItemId::new(format!("k{:08}{}", self.next_key, &suffix[..8]))
    }

    fn broadcast(&mut self, event: StoreEvent) {
        for client in &mut self.clients {
            client.events.push(event.clone());
        }
    }

    fn check_write(&mut self) -> StoreResult<()> {
        if self.offline {
            return Err(StoreError::Offline);
        }
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(StoreError::Rejected("write refused".into()));
        }
        Ok(())
    }

    fn entries(&mut self, kind: ItemKind) -> &mut Vec<(ItemId, Fields)> {
        self.collections.entry(kind).or_default()
    }

    fn set(&mut self, kind: ItemKind, id: ItemId, value: Fields) {
        let entries = self.entries(kind);
        let value: Fields = value.into_iter().filter(|(_, v)| !v.is_null()).collect();
        let event = match entries.iter_mut().find(|(key, _)| key == &id) {
            Some(slot) => {
                slot.1 = value.clone();
                StoreEvent::Changed { kind, id, value }
            }
            None => {
                entries.push((id.clone(), value.clone()));
                StoreEvent::Added { kind, id, value }
            }
        };
        self.broadcast(event);
    }

    fn update(&mut self, kind: ItemKind, id: ItemId, fields: Fields) {
        let entries = self.entries(kind);
        let existing = entries.iter().position(|(key, _)| key == &id);
        let mut merged = existing
            .map(|index| entries[index].1.clone())
            .unwrap_or_default();
        for (key, value) in fields {
            if value.is_null() {
                merged.remove(&key);
            } else {
                merged.insert(key, value);
            }
        }
        match existing {
            Some(_) if merged.is_empty() => self.remove(kind, &id),
            Some(_) => self.set(kind, id, merged),
            None if merged.is_empty() => {}
            None => self.set(kind, id, merged),
        }
    }

    fn remove(&mut self, kind: ItemKind, id: &ItemId) {
        let entries = self.entries(kind);
        if let Some(index) = entries.iter().position(|(key, _)| key == id) {
            entries.remove(index);
            self.broadcast(StoreEvent::Removed {
                kind,
                id: id.clone(),
            });
        }
    }

    fn presence_changed(&mut self) {
        let count = self.presence.len();
        self.broadcast(StoreEvent::Presence { count });
    }
}

/// The shared service all clients talk to.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    shared: Rc<RefCell<Shared>>,
}

impl MemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a new client. Its feed starts with an `Added` event for
    /// every existing item, then the current presence count.
    pub fn connect(&self) -> MemoryStore {
        let mut shared = self.shared.borrow_mut();
        shared.next_client += 1;
        let id = shared.next_client;

        let mut events = Vec::new();
        for kind in ItemKind::ALL {
            if let Some(entries) = shared.collections.get(&kind) {
                events.extend(entries.iter().map(|(key, value)| StoreEvent::Added {
                    kind,
                    id: key.clone(),
                    value: value.clone(),
                }));
            }
        }
        events.push(StoreEvent::Presence {
            count: shared.presence.len(),
        });
        shared.clients.push(Client { id, events });
        log::debug!("Memory store client {id} connected");

        MemoryStore {
            shared: Rc::clone(&self.shared),
            client: id,
        }
    }

    /// Current items of a collection, in insertion order.
    pub fn items(&self, kind: ItemKind) -> Vec<(ItemId, Fields)> {
        self.shared
            .borrow()
            .collections
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    pub fn get(&self, kind: ItemKind, id: &ItemId) -> Option<Fields> {
        self.shared
            .borrow()
            .collections
            .get(&kind)?
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, value)| value.clone())
    }

    pub fn len(&self, kind: ItemKind) -> usize {
        self.shared
            .borrow()
            .collections
            .get(&kind)
            .map_or(0, Vec::len)
    }

    pub fn presence_count(&self) -> usize {
        self.shared.borrow().presence.len()
    }

    /// While offline every write fails with [`StoreError::Offline`].
    pub fn set_offline(&self, offline: bool) {
        self.shared.borrow_mut().offline = offline;
    }

    /// Reject the next `count` writes.
    pub fn fail_next(&self, count: usize) {
        self.shared.borrow_mut().fail_next = count;
    }

    /// Hold writes in flight until [`MemoryBackend::resume`].
    pub fn pause(&self) {
        self.shared.borrow_mut().paused = true;
    }

    pub fn resume(&self) {
        let waiters = {
            let mut shared = self.shared.borrow_mut();
            shared.paused = false;
            std::mem::take(&mut shared.waiters)
        };
        for waker in waiters {
            waker.wake();
        }
    }
}

/// One client's handle on a [`MemoryBackend`].
pub struct MemoryStore {
    shared: Rc<RefCell<Shared>>,
    client: u64,
}

impl MemoryStore {
    /// Resolve once writes are not paused.
    async fn ready(&self) {
        poll_fn(|cx| {
            let mut shared = self.shared.borrow_mut();
            if shared.paused {
                shared.waiters.push(cx.waker().clone());
                Poll::Pending
            } else {
                Poll::Ready(())
            }
        })
        .await
    }

    fn write<F>(&self, apply: F) -> BoxFuture<'_, StoreResult<()>>
    where
        F: FnOnce(&mut Shared) + 'static,
    {
        Box::pin(async move {
            self.ready().await;
            let mut shared = self.shared.borrow_mut();
            shared.check_write()?;
            apply(&mut *shared);
            Ok(())
        })
    }
}

impl RemoteStore for MemoryStore {
    fn generate_id(&self, _kind: ItemKind) -> ItemId {
        self.shared.borrow_mut().new_key()
    }

    fn set(&self, kind: ItemKind, id: &ItemId, value: Fields) -> BoxFuture<'_, StoreResult<()>> {
        let id = id.clone();
        self.write(move |shared| shared.set(kind, id, value))
    }

    fn update(&self, kind: ItemKind, id: &ItemId, fields: Fields) -> BoxFuture<'_, StoreResult<()>> {
        let id = id.clone();
        self.write(move |shared| shared.update(kind, id, fields))
    }

    fn remove(&self, kind: ItemKind, id: &ItemId) -> BoxFuture<'_, StoreResult<()>> {
        let id = id.clone();
        self.write(move |shared| shared.remove(kind, &id))
    }

    fn remove_all(&self, kind: ItemKind) -> BoxFuture<'_, StoreResult<()>> {
        self.write(move |shared| {
            let ids: Vec<ItemId> = shared.entries(kind).iter().map(|(id, _)| id.clone()).collect();
            for id in ids {
                shared.remove(kind, &id);
            }
        })
    }

    fn join_presence(&self) -> BoxFuture<'_, StoreResult<ItemId>> {
        Box::pin(async move {
            self.ready().await;
            let mut shared = self.shared.borrow_mut();
            if shared.offline {
                return Err(StoreError::Offline);
            }
            let key = shared.new_key();
            shared.presence.push((self.client, key.clone()));
            shared.presence_changed();
            log::info!("Client {} joined presence as {key}", self.client);
            Ok(key)
        })
    }

    fn poll_events(&self) -> Vec<StoreEvent> {
        let mut shared = self.shared.borrow_mut();
        shared
            .clients
            .iter_mut()
            .find(|c| c.id == self.client)
            .map(|c| std::mem::take(&mut c.events))
            .unwrap_or_default()
    }
}

impl Drop for MemoryStore {
    fn drop(&mut self) {
        let Ok(mut shared) = self.shared.try_borrow_mut() else {
            return;
        };
        let client = self.client;
        shared.clients.retain(|c| c.id != client);
        let before = shared.presence.len();
        shared.presence.retain(|(owner, _)| *owner != client);
        if shared.presence.len() != before {
            log::info!("Client {client} left presence");
            shared.presence_changed();
        }
    }
}
