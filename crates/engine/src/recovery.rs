/// Cold-start path: replaying the data file into a key directory, repairing a
/// torn tail, and clearing out debris from an interrupted merge.
use anyhow::{Context, Result};
use datafile::{DataFileError, DataFileReader, Record};
use keydir::KeyDir;
use std::fs::OpenOptions;
use std::path::Path;

use crate::{Engine, MERGE_FILENAME};

/// Replays a data file into `keydir`, returning the offset just past the last
/// complete record.
///
/// If the file does not exist, returns `Ok(0)` (fresh start).
///
/// # Errors
///
/// Propagates any I/O or corruption error from [`DataFileReader::replay`].
pub fn replay_data_file<P: AsRef<Path>>(path: P, keydir: &mut KeyDir) -> Result<u64> {
    match DataFileReader::open(path.as_ref()) {
        Ok(mut reader) => {
            let valid_len = reader
                .replay(|pos, record| match record {
                    Record::Put { key, .. } => {
                        keydir.insert(key, pos);
                    }
                    Record::Del { key } => {
                        keydir.remove(&key);
                        keydir.note_dead(pos.len);
                    }
                })
                .with_context(|| format!("failed to replay {}", path.as_ref().display()))?;
            Ok(valid_len)
        }
        Err(DataFileError::Io(ref e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(anyhow::anyhow!(e).context("failed to open data file for replay")),
    }
}

impl Engine {
    /// Cuts the data file back to `valid_len` when a crash left a partial
    /// frame behind. Without this, later appends would land after the torn
    /// bytes and be unreachable on the next replay.
    pub(crate) fn truncate_torn_tail(path: &Path, valid_len: u64) -> Result<()> {
        let actual = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };
        if actual <= valid_len {
            return Ok(());
        }

        tracing::warn!(
            path = %path.display(),
            valid_len,
            discarded = actual - valid_len,
            "truncating torn record at end of data file"
        );
        let f = OpenOptions::new().write(true).open(path)?;
        f.set_len(valid_len)?;
        f.sync_all()?;
        Ok(())
    }

    /// Removes a merge file left behind by a crash during [`Engine::merge`].
    /// The live data file is untouched until the rename, so the leftover is
    /// always safe to discard.
    pub(crate) fn cleanup_merge_file(dir: &Path) {
        let p = dir.join(MERGE_FILENAME);
        if p.exists() {
            tracing::warn!(path = %p.display(), "removing leftover merge file");
            if let Err(e) = std::fs::remove_file(&p) {
                tracing::warn!(path = %p.display(), error = %e, "failed to remove leftover merge file");
            }
        }
    }
}
