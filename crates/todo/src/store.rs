use anyhow::anyhow;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};

use crate::codec::{decode_item, encode_item};
use crate::keys::item_key;
use crate::{list, IdAllocator, Item, KvBackend, Result, TodoError};

pub const DEFAULT_MAX_ITEMS: usize = 100;
pub const DEFAULT_MAX_TITLE_LENGTH: usize = 100;

/// Write-time caps enforced by [`TodoStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Creation is refused once this many items exist.
    pub max_items: usize,
    /// Titles are cut to this many characters.
    pub max_title_length: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            max_title_length: DEFAULT_MAX_TITLE_LENGTH,
        }
    }
}

/// The todo list, persisted in a [`KvBackend`].
///
/// Every operation takes the store-wide lock for its full duration. That
/// covers the counter's read-increment-write in [`create`](Self::create) and
/// the read-flip-write in [`toggle`](Self::toggle). Item and counter writes
/// are separate backend calls and are not atomic together.
pub struct TodoStore<B> {
    backend: Mutex<B>,
    allocator: IdAllocator,
    limits: Limits,
}

impl<B: KvBackend> TodoStore<B> {
    pub fn new(backend: B, limits: Limits) -> Self {
        Self {
            backend: Mutex::new(backend),
            allocator: IdAllocator::new(),
            limits,
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Adds a new item with `done = false`.
    ///
    /// # Errors
    ///
    /// [`TodoError::Capacity`] when `max_items` items already exist. In that
    /// case no item is written and no id is consumed.
    pub fn create(&self, title: &str) -> Result<Item> {
        let mut backend = self.lock()?;

        let count = list::count_items(&*backend)?;
        if count >= self.limits.max_items {
            tracing::warn!(
                count,
                max_items = self.limits.max_items,
                "refusing to add todo, list is full"
            );
            return Err(TodoError::Capacity {
                max_items: self.limits.max_items,
            });
        }

        let id = self.allocator.next_id(&*backend)?;
        let item = Item::new(
            id,
            truncate_title(title, self.limits.max_title_length),
            Utc::now(),
        );
        let payload =
            encode_item(&item).map_err(|e| anyhow!(e).context("failed to encode todo"))?;

        // The item goes in before the counter moves.
        backend.put(&item_key(id), payload)?;
        self.allocator.advance(&mut *backend, id)?;

        tracing::debug!(id, "todo added");
        Ok(item)
    }

    /// Flips `done` on an existing item and returns the updated item.
    pub fn toggle(&self, id: u64) -> Result<Item> {
        let mut backend = self.lock()?;

        let key = item_key(id);
        let mut item = load_item(&*backend, &key)?.ok_or(TodoError::NotFound { id })?;
        item.toggle_done();

        let payload =
            encode_item(&item).map_err(|e| anyhow!(e).context("failed to encode todo"))?;
        backend.put(&key, payload)?;

        tracing::debug!(id, done = item.done, "todo toggled");
        Ok(item)
    }

    /// Removes an item. Removing an id that does not exist is not an error.
    pub fn delete(&self, id: u64) -> Result<()> {
        let mut backend = self.lock()?;
        backend.delete(&item_key(id))?;
        tracing::debug!(id, "todo cleared");
        Ok(())
    }

    pub fn get(&self, id: u64) -> Result<Item> {
        let backend = self.lock()?;
        load_item(&*backend, &item_key(id))?.ok_or(TodoError::NotFound { id })
    }

    /// All items, ordered by ascending id.
    pub fn list(&self) -> Result<Vec<Item>> {
        let backend = self.lock()?;
        list::assemble(&*backend)
    }

    /// Number of items currently stored.
    pub fn len(&self) -> Result<usize> {
        let backend = self.lock()?;
        list::count_items(&*backend)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Gives the backend back, e.g. to close and reopen it.
    pub fn into_inner(self) -> B {
        self.backend
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock(&self) -> Result<MutexGuard<'_, B>> {
        self.backend
            .lock()
            .map_err(|_| TodoError::Storage(anyhow!("todo store lock poisoned")))
    }
}

/// Reads and decodes the item stored under `key`, if any.
pub(crate) fn load_item<B: KvBackend + ?Sized>(backend: &B, key: &[u8]) -> Result<Option<Item>> {
    match backend.get(key)? {
        Some(raw) => decode_item(&raw)
            .map(Some)
            .map_err(|source| TodoError::decode(key, source)),
        None => Ok(None),
    }
}

/// Cuts `title` to at most `max` characters (Unicode scalar values), never
/// splitting a character.
pub fn truncate_title(title: &str, max: usize) -> String {
    match title.char_indices().nth(max) {
        Some((idx, _)) => title[..idx].to_owned(),
        None => title.to_owned(),
    }
}
