use crate::Engine;
use std::fs;
use std::path::Path;

pub fn data_file_len(dir: &Path) -> u64 {
    fs::metadata(dir.join(crate::DATA_FILENAME))
        .map(|m| m.len())
        .unwrap_or(0)
}

/// Opens an engine with auto-merge disabled so tests control file layout.
pub fn open_manual(dir: &Path) -> Engine {
    let mut engine = Engine::open(dir, false).unwrap();
    engine.set_merge_trigger(0);
    engine
}
