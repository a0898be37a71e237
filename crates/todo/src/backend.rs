//! The key-value boundary the todo store is written against.
use anyhow::Result;
use engine::Engine;
use std::collections::BTreeMap;

/// Minimal key-value interface the store needs.
///
/// `len` counts every key, including the ID counter.
pub trait KvBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    fn delete(&mut self, key: &[u8]) -> Result<()>;

    /// Visits every key, stopping at the first error the callback returns.
    fn fold_keys(&self, f: &mut dyn FnMut(&[u8]) -> Result<()>) -> Result<()>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvBackend for Engine {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Engine::get(self, key)
    }

    fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        Engine::put(self, key.to_vec(), value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        Engine::delete(self, key.to_vec())
    }

    fn fold_keys(&self, f: &mut dyn FnMut(&[u8]) -> Result<()>) -> Result<()> {
        Engine::fold_keys(self, f)
    }

    fn len(&self) -> usize {
        Engine::len(self)
    }
}

/// In-memory backend for tests and throwaway stores.
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Ok(self.map.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: Vec<u8>) -> Result<()> {
        self.map.insert(key.to_vec(), value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.map.remove(key);
        Ok(())
    }

    fn fold_keys(&self, f: &mut dyn FnMut(&[u8]) -> Result<()>) -> Result<()> {
        for key in self.map.keys() {
            f(key)?;
        }
        Ok(())
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}
