//! In-memory key directory for the append-only data file.
//!
//! Maps every live key to the position of its latest `Put` frame. Deleted
//! keys are removed outright; the tombstone only lives on disk. The directory
//! also keeps track of how many bytes of the data file are still referenced
//! (`live_bytes`) and how many have been superseded (`dead_bytes`), which is
//! what the engine uses to decide when a merge is worth running.
use datafile::RecordPos;
use std::collections::BTreeMap;

#[derive(Debug)]
pub struct KeyDir {
    map: BTreeMap<Vec<u8>, RecordPos>,
    live_bytes: u64,
    dead_bytes: u64,
}

impl KeyDir {
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
            live_bytes: 0,
            dead_bytes: 0,
        }
    }

    /// Points `key` at a new frame. Returns the position it replaced, whose
    /// bytes are now dead.
    pub fn insert(&mut self, key: Vec<u8>, pos: RecordPos) -> Option<RecordPos> {
        self.live_bytes += pos.len;
        let old = self.map.insert(key, pos);
        if let Some(old) = old {
            self.retire(old);
        }
        old
    }

    /// Forgets `key`. Returns the position it pointed at, if any.
    pub fn remove(&mut self, key: &[u8]) -> Option<RecordPos> {
        let old = self.map.remove(key);
        if let Some(old) = old {
            self.retire(old);
        }
        old
    }

    /// Accounts for a frame that is dead from the moment it is written
    /// (tombstones).
    pub fn note_dead(&mut self, bytes: u64) {
        self.dead_bytes += bytes;
    }

    fn retire(&mut self, pos: RecordPos) {
        self.live_bytes = self.live_bytes.saturating_sub(pos.len);
        self.dead_bytes += pos.len;
    }

    pub fn get(&self, key: &[u8]) -> Option<RecordPos> {
        self.map.get(key).copied()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.map.contains_key(key)
    }

    /// Live keys in ascending byte order.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.map.keys().map(Vec::as_slice)
    }

    /// Ordered iterator over `(key, position)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Vec<u8>, &RecordPos)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn live_bytes(&self) -> u64 {
        self.live_bytes
    }

    pub fn dead_bytes(&self) -> u64 {
        self.dead_bytes
    }
}

impl Default for KeyDir {
    fn default() -> Self {
        Self::new()
    }
}
