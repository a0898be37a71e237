/// Merge: rewrites the data file so it only contains live records.
///
/// Live frames are copied in key order into [`MERGE_FILENAME`], the copy is
/// fsynced and renamed over the data file, and the key directory is swapped
/// for the one built while copying. Tombstones and superseded values are
/// dropped because nothing older than the new file remains to be shadowed.
use anyhow::{Context, Result};
use datafile::DataFileWriter;
use keydir::KeyDir;
use std::fs::File;
use std::path::Path;

use crate::{Engine, MERGE_FILENAME};

impl Engine {
    /// Compacts the data file down to the latest value of every live key.
    ///
    /// A no-op when no dead bytes exist. Called automatically once dead bytes
    /// reach [`Engine::merge_trigger`] (a failure there is only logged), or
    /// manually by the caller, who sees the error.
    ///
    /// # Errors
    ///
    /// Returns an error on I/O failure while copying, syncing or renaming.
    /// The live data file is only replaced after the copy is complete, so a
    /// failed merge leaves the store exactly as it was.
    pub fn merge(&mut self) -> Result<()> {
        if self.keydir.dead_bytes() == 0 {
            return Ok(());
        }

        let before = self.writer.len();
        let merge_path = self.dir.join(MERGE_FILENAME);

        let merged = match self.write_merge_file(&merge_path) {
            Ok(merged) => merged,
            Err(e) => {
                if merge_path.is_file() {
                    if let Err(rm) = std::fs::remove_file(&merge_path) {
                        tracing::warn!(path = %merge_path.display(), error = %rm, "failed to remove partial merge file");
                    }
                }
                return Err(e);
            }
        };

        std::fs::rename(&merge_path, &self.data_path).with_context(|| {
            format!(
                "failed to move {} over {}",
                merge_path.display(),
                self.data_path.display()
            )
        })?;

        // The old handles still point at the replaced file.
        self.writer = DataFileWriter::open(&self.data_path, self.sync)?;
        self.reader = File::open(&self.data_path)?;
        self.keydir = merged;

        tracing::info!(
            keys = self.keydir.len(),
            before_bytes = before,
            after_bytes = self.writer.len(),
            "data file merged"
        );
        Ok(())
    }

    fn write_merge_file(&self, path: &Path) -> Result<KeyDir> {
        // A stale file here would make the append-mode writer extend it.
        if path.exists() {
            std::fs::remove_file(path)?;
        }

        let mut out = DataFileWriter::open(path, false)?;
        let mut merged = KeyDir::new();

        for (key, pos) in self.keydir.iter() {
            let record = datafile::read_at(&self.reader, *pos)
                .with_context(|| format!("failed to copy record at offset {}", pos.offset))?;
            let new_pos = out.append(&record)?;
            merged.insert(key.clone(), new_pos);
        }

        out.sync_to_disk()?;
        Ok(merged)
    }
}
