use crate::codec::encode_item;
use crate::keys::item_key;
use crate::{Item, KvBackend, Limits, MemoryBackend, TodoStore};
use anyhow::{bail, Result};
use chrono::{TimeZone, Utc};

pub fn store_with(max_items: usize, max_title_length: usize) -> TodoStore<MemoryBackend> {
    TodoStore::new(
        MemoryBackend::new(),
        Limits {
            max_items,
            max_title_length,
        },
    )
}

pub fn item(id: u64, title: &str, done: bool) -> Item {
    Item {
        id,
        title: title.to_string(),
        done,
        created_at: Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap(),
    }
}

/// Writes an item record directly, bypassing the allocator.
pub fn put_item(backend: &mut MemoryBackend, item: &Item) {
    backend
        .put(&item_key(item.id), encode_item(item).unwrap())
        .unwrap();
}

/// Wraps a [`MemoryBackend`] and fails writes to one chosen key.
pub struct FailingBackend {
    pub inner: MemoryBackend,
    pub fail_put_on: Option<Vec<u8>>,
    pub fail_get: bool,
}

impl FailingBackend {
    pub fn new() -> Self {
        Self {
            inner: MemoryBackend::new(),
            fail_put_on: None,
            fail_get: false,
        }
    }
}

impl KvBackend for FailingBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        if self.fail_get {
            bail!("disk on fire");
        }
        self.inner.get(key)
    }

    fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        if self.fail_put_on.as_deref() == Some(key) {
            bail!("write rejected");
        }
        self.inner.put(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.inner.delete(key)
    }

    fn fold_keys(&self, f: &mut dyn FnMut(&[u8]) -> Result<()>) -> Result<()> {
        self.inner.fold_keys(f)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
