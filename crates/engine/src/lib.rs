//! # Engine - embedded log-structured key-value store
//!
//! Ties the [`datafile`] and [`keydir`] crates together into the small
//! Bitcask-style store the todo service persists into.
//!
//! ## Architecture
//!
//! ```text
//! Client
//!   |
//!   v
//! ┌───────────────────────────────────────────────┐
//! │                   ENGINE                      │
//! │                                               │
//! │ write.rs → data file append → KeyDir update   │
//! │              |                                │
//! │              |  (dead bytes >= trigger?)      │
//! │              |            yes                 │
//! │              v                                │
//! │           merge() → rewritten data file       │
//! │                                               │
//! │ read.rs → KeyDir lookup → positioned read     │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Module Responsibilities
//!
//! | Module       | Purpose                                                 |
//! |--------------|---------------------------------------------------------|
//! | [`lib.rs`]   | `Engine` struct, `open`, accessors, `Debug`, `Drop`     |
//! | [`recovery`] | data file replay, torn-tail repair, merge leftovers     |
//! | [`write`]    | `put()`, `delete()`, `sync()`                           |
//! | [`read`]     | `get()`, `contains()`, `len()`, `fold_keys()`, `keys()` |
//! | [`merge`]    | `merge()`: rewrite live records, atomic rename          |
//!
//! ## Crash Safety
//!
//! Every write is appended to the data file **before** the key directory
//! changes, so an acknowledged write is always recoverable by replay. A crash
//! mid-append leaves a torn frame at the tail which is cut off on the next
//! open. A merge writes a complete new file next to the live one and only
//! renames it into place once it has been fsynced.
//!
//! ## Concurrency
//!
//! Reads seek a shared file handle. An `Engine` used from several threads
//! must sit behind a lock; `&self` methods are not safe to interleave.
mod merge;
mod read;
mod recovery;
mod write;

use anyhow::{Context, Result};
use datafile::DataFileWriter;
use keydir::KeyDir;
pub use recovery::replay_data_file;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Maximum allowed key size in bytes (64 KiB).
pub const MAX_KEY_SIZE: usize = 64 * 1024;
/// Maximum allowed value size in bytes (10 MiB).
pub const MAX_VALUE_SIZE: usize = 10 * 1024 * 1024;

/// Name of the live data file inside the engine directory.
pub const DATA_FILENAME: &str = "data.log";
/// Scratch file a merge writes into before renaming it over [`DATA_FILENAME`].
pub const MERGE_FILENAME: &str = "data.log.merge";

/// Default number of dead bytes that triggers an automatic merge (1 MiB).
///
/// Set to `0` with [`Engine::set_merge_trigger`] to disable auto-merge.
pub const DEFAULT_MERGE_TRIGGER: u64 = 1024 * 1024;

/// The storage engine: one append-only data file plus an in-memory index.
///
/// # Write Path
///
/// 1. Validate key and value sizes.
/// 2. Append the record to the data file (optionally fsynced).
/// 3. Point the key directory at the new frame.
/// 4. If superseded bytes reach the merge trigger, merge.
///
/// # Read Path
///
/// 1. Look the key up in the key directory.
/// 2. Read and CRC-check the single frame it points at.
///
/// # Recovery
///
/// On [`Engine::open`] the data file is replayed front to back into a fresh
/// key directory.
pub struct Engine {
    pub(crate) dir: PathBuf,
    pub(crate) data_path: PathBuf,
    pub(crate) writer: DataFileWriter,
    /// Read handle for point lookups; reopened after every merge.
    pub(crate) reader: File,
    pub(crate) keydir: KeyDir,

    /// If `true`, every append is followed by `fsync`.
    pub(crate) sync: bool,

    /// Dead-byte threshold for automatic merges. `0` disables them.
    pub(crate) merge_trigger: u64,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("dir", &self.dir)
            .field("sync", &self.sync)
            .field("keys", &self.keydir.len())
            .field("file_bytes", &self.writer.len())
            .field("live_bytes", &self.keydir.live_bytes())
            .field("dead_bytes", &self.keydir.dead_bytes())
            .field("merge_trigger", &self.merge_trigger)
            .finish()
    }
}

impl Engine {
    /// Opens the store in `dir`, creating it if needed and recovering any
    /// existing data.
    ///
    /// # Recovery Steps
    ///
    /// 1. Create the directory if it does not exist.
    /// 2. Remove a leftover merge file from an interrupted merge.
    /// 3. Replay the data file into a fresh key directory.
    /// 4. Cut off a torn tail record so new appends follow the last good one.
    /// 5. Open the append writer and the read handle.
    pub fn open<P: AsRef<Path>>(dir: P, sync: bool) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create store directory {}", dir.display()))?;

        Self::cleanup_merge_file(&dir);

        let data_path = dir.join(DATA_FILENAME);
        let mut keydir = KeyDir::new();
        let valid_len = replay_data_file(&data_path, &mut keydir)?;
        Self::truncate_torn_tail(&data_path, valid_len)?;

        let writer = DataFileWriter::open(&data_path, sync)?;
        let reader = File::open(&data_path)
            .with_context(|| format!("failed to open {} for reading", data_path.display()))?;

        tracing::info!(
            dir = %dir.display(),
            keys = keydir.len(),
            file_bytes = writer.len(),
            dead_bytes = keydir.dead_bytes(),
            "store opened"
        );

        Ok(Self {
            dir,
            data_path,
            writer,
            reader,
            keydir,
            sync,
            merge_trigger: DEFAULT_MERGE_TRIGGER,
        })
    }

    /// Directory the store lives in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Current size of the data file in bytes.
    #[must_use]
    pub fn file_size(&self) -> u64 {
        self.writer.len()
    }

    /// Bytes of the data file no longer referenced by any live key.
    #[must_use]
    pub fn dead_bytes(&self) -> u64 {
        self.keydir.dead_bytes()
    }

    /// Returns the current auto-merge threshold in dead bytes.
    #[must_use]
    pub fn merge_trigger(&self) -> u64 {
        self.merge_trigger
    }

    /// Updates the auto-merge threshold. Set to `0` to disable auto-merge.
    pub fn set_merge_trigger(&mut self, trigger: u64) {
        self.merge_trigger = trigger;
    }
}

/// Best-effort sync on drop.
///
/// Only matters when `sync` is off; errors are ignored because Drop cannot
/// propagate them.
impl Drop for Engine {
    fn drop(&mut self) {
        if !self.sync {
            let _ = self.writer.sync_to_disk();
        }
    }
}

#[cfg(test)]
mod tests;
