/// Read path: point lookups and key iteration.
///
/// Lookups go through the key directory and then read exactly one frame from
/// the data file. Key iteration never touches the disk.
use anyhow::{Context, Result};
use datafile::Record;

use crate::Engine;

impl Engine {
    /// Looks up a key, returning its value if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be read, fails its checksum, or
    /// does not belong to `key` (the key directory and file disagree).
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let Some(pos) = self.keydir.get(key) else {
            return Ok(None);
        };

        let record = datafile::read_at(&self.reader, pos).with_context(|| {
            format!(
                "failed to read record for key {:?} at offset {}",
                String::from_utf8_lossy(key),
                pos.offset
            )
        })?;

        match record {
            Record::Put { key: stored, value } if stored == key => Ok(Some(value)),
            _ => anyhow::bail!(
                "data file entry at offset {} does not hold key {:?}",
                pos.offset,
                String::from_utf8_lossy(key)
            ),
        }
    }

    /// Returns `true` if the key is currently live.
    #[must_use]
    pub fn contains(&self, key: &[u8]) -> bool {
        self.keydir.contains_key(key)
    }

    /// Number of live keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keydir.len()
    }

    /// Returns `true` when the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keydir.is_empty()
    }

    /// Calls `f` for every live key in ascending byte order, stopping at the
    /// first error.
    pub fn fold_keys<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&[u8]) -> Result<()>,
    {
        for key in self.keydir.keys() {
            f(key)?;
        }
        Ok(())
    }

    /// Snapshot of all live keys in ascending byte order.
    #[must_use]
    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.keydir.keys().map(<[u8]>::to_vec).collect()
    }
}
