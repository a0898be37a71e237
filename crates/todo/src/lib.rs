//! # Todo - item persistence and identity allocation
//!
//! Stores todo items in a key-value backend and hands out their IDs.
//!
//! ```text
//! TodoStore ──┬── IdAllocator ── "nextid" → 8-byte big-endian u64
//!             ├── codec       ── "todo_<id>" → JSON item
//!             └── list        ── full key scan → items sorted by id
//! ```
//!
//! The store owns its backend behind a mutex, so every operation is one
//! critical section: the allocator's read-increment-write and a toggle's
//! read-flip-write can never interleave with another call.
//!
//! ## Example
//!
//! ```rust
//! use todo::{Limits, MemoryBackend, TodoStore};
//!
//! let store = TodoStore::new(MemoryBackend::new(), Limits::default());
//! let item = store.create("water the plants").unwrap();
//! store.toggle(item.id).unwrap();
//! assert!(store.list().unwrap()[0].done);
//! ```
mod allocator;
mod backend;
pub mod codec;
mod error;
pub mod keys;
mod list;
mod model;
mod store;

pub use allocator::{IdAllocator, FIRST_ID};
pub use backend::{KvBackend, MemoryBackend};
pub use codec::CodecError;
pub use error::{Result, TodoError};
pub use list::{assemble, count_items};
pub use model::Item;
pub use store::{truncate_title, Limits, TodoStore, DEFAULT_MAX_ITEMS, DEFAULT_MAX_TITLE_LENGTH};

#[cfg(test)]
mod tests;
