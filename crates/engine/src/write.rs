/// Write path: `put()`, `delete()` and `sync()`.
///
/// Every mutation is appended to the data file first and only then reflected
/// in the key directory. After each write the engine checks whether enough
/// superseded bytes have piled up to make a merge worthwhile.
use anyhow::Result;
use datafile::Record;

use crate::{Engine, MAX_KEY_SIZE, MAX_VALUE_SIZE};

impl Engine {
    /// Inserts or overwrites a key-value pair.
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        check_key(&key)?;
        anyhow::ensure!(
            value.len() <= MAX_VALUE_SIZE,
            "value too large: {} bytes (max {})",
            value.len(),
            MAX_VALUE_SIZE
        );

        // Append to the data file first
        let pos = self.writer.append(&Record::Put {
            key: key.clone(),
            value,
        })?;

        self.keydir.insert(key, pos);

        self.maybe_merge()
    }

    /// Deletes a key by appending a tombstone.
    ///
    /// Deleting a key that is not present is a no-op: nothing is written and
    /// no error is returned.
    pub fn delete(&mut self, key: Vec<u8>) -> Result<()> {
        check_key(&key)?;

        if !self.keydir.contains_key(&key) {
            return Ok(());
        }

        let pos = self.writer.append(&Record::Del { key: key.clone() })?;
        self.keydir.remove(&key);
        self.keydir.note_dead(pos.len);

        self.maybe_merge()
    }

    /// Forces everything written so far onto disk.
    ///
    /// Only needed when the engine was opened with `sync = false`.
    pub fn sync(&mut self) -> Result<()> {
        self.writer.sync_to_disk()?;
        Ok(())
    }

    /// Runs an automatic merge when dead bytes reach the trigger.
    ///
    /// The write that got us here is already appended and indexed, so a
    /// failed merge is logged and never reported as a failed write. The next
    /// write retries it.
    fn maybe_merge(&mut self) -> Result<()> {
        if self.merge_trigger > 0 && self.keydir.dead_bytes() >= self.merge_trigger {
            if let Err(e) = self.merge() {
                tracing::warn!(
                    error = %format!("{e:#}"),
                    dead_bytes = self.keydir.dead_bytes(),
                    "automatic merge failed"
                );
            }
        }
        Ok(())
    }
}

fn check_key(key: &[u8]) -> Result<()> {
    anyhow::ensure!(!key.is_empty(), "key must not be empty");
    anyhow::ensure!(
        key.len() <= MAX_KEY_SIZE,
        "key too large: {} bytes (max {})",
        key.len(),
        MAX_KEY_SIZE
    );
    Ok(())
}
