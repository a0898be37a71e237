use super::helpers::{data_file_len, open_manual};
use crate::*;
use anyhow::Result;
use tempfile::tempdir;

#[test]
fn merge_without_dead_bytes_is_noop() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = open_manual(dir.path());
    engine.put(b"k".to_vec(), b"v".to_vec())?;

    let before = engine.file_size();
    engine.merge()?;
    assert_eq!(engine.file_size(), before);
    Ok(())
}

#[test]
fn merge_drops_superseded_values_and_tombstones() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = open_manual(dir.path());

    for i in 0..50 {
        engine.put(b"counter".to_vec(), format!("{}", i).into_bytes())?;
    }
    engine.put(b"gone".to_vec(), b"x".to_vec())?;
    engine.delete(b"gone".to_vec())?;
    engine.put(b"kept".to_vec(), b"y".to_vec())?;

    let before = engine.file_size();
    engine.merge()?;

    assert!(engine.file_size() < before);
    assert_eq!(engine.dead_bytes(), 0);
    assert_eq!(engine.len(), 2);
    assert_eq!(engine.get(b"counter")?, Some(b"49".to_vec()));
    assert_eq!(engine.get(b"kept")?, Some(b"y".to_vec()));
    assert!(engine.get(b"gone")?.is_none());
    assert!(!dir.path().join(MERGE_FILENAME).exists());
    Ok(())
}

#[test]
fn writes_after_merge_land_in_new_file() -> Result<()> {
    let dir = tempdir()?;
    {
        let mut engine = open_manual(dir.path());
        engine.put(b"a".to_vec(), b"1".to_vec())?;
        engine.put(b"a".to_vec(), b"2".to_vec())?;
        engine.merge()?;
        engine.put(b"b".to_vec(), b"3".to_vec())?;
        assert_eq!(engine.get(b"a")?, Some(b"2".to_vec()));
        assert_eq!(engine.get(b"b")?, Some(b"3".to_vec()));
    }

    let engine = Engine::open(dir.path(), true)?;
    assert_eq!(engine.get(b"a")?, Some(b"2".to_vec()));
    assert_eq!(engine.get(b"b")?, Some(b"3".to_vec()));
    assert_eq!(engine.dead_bytes(), 0);
    Ok(())
}

#[test]
fn auto_merge_fires_at_trigger() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = Engine::open(dir.path(), false)?;
    engine.set_merge_trigger(256);

    for i in 0..200 {
        engine.put(b"hot".to_vec(), format!("value-{}", i).into_bytes())?;
    }

    assert!(engine.dead_bytes() < 256);
    assert!(data_file_len(dir.path()) < 200 * 20);
    assert_eq!(engine.get(b"hot")?, Some(b"value-199".to_vec()));
    Ok(())
}

#[test]
fn disabled_trigger_never_merges() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = open_manual(dir.path());
    assert_eq!(engine.merge_trigger(), 0);

    for i in 0..100 {
        engine.put(b"hot".to_vec(), format!("{}", i).into_bytes())?;
    }
    assert!(engine.dead_bytes() > 0);
    Ok(())
}

#[test]
fn failed_auto_merge_does_not_fail_the_write() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = Engine::open(dir.path(), false)?;
    engine.set_merge_trigger(1);

    engine.put(b"a".to_vec(), b"1".to_vec())?;
    // A directory where the merge file goes makes every merge fail.
    std::fs::create_dir(dir.path().join(MERGE_FILENAME))?;

    engine.put(b"a".to_vec(), b"2".to_vec())?;
    engine.put(b"b".to_vec(), b"3".to_vec())?;
    engine.delete(b"b".to_vec())?;
    assert!(engine.dead_bytes() > 0, "merge should not have happened");
    assert_eq!(engine.get(b"a")?, Some(b"2".to_vec()));

    // An explicit merge still reports the failure.
    assert!(engine.merge().is_err());
    assert!(dir.path().join(MERGE_FILENAME).is_dir());

    std::fs::remove_dir(dir.path().join(MERGE_FILENAME))?;
    engine.put(b"c".to_vec(), b"4".to_vec())?;
    assert_eq!(engine.dead_bytes(), 0);
    drop(engine);

    let engine = Engine::open(dir.path(), false)?;
    assert_eq!(engine.keys(), vec![b"a".to_vec(), b"c".to_vec()]);
    Ok(())
}

#[test]
fn open_survives_unremovable_merge_leftover() -> Result<()> {
    let dir = tempdir()?;
    {
        let mut engine = Engine::open(dir.path(), false)?;
        engine.put(b"k".to_vec(), b"v".to_vec())?;
    }
    std::fs::create_dir(dir.path().join(MERGE_FILENAME))?;

    let engine = Engine::open(dir.path(), false)?;
    assert_eq!(engine.get(b"k")?, Some(b"v".to_vec()));
    Ok(())
}
