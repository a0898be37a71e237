use super::helpers::{data_file_len, open_manual};
use crate::*;
use anyhow::Result;
use tempfile::tempdir;

// --------------------- Basic put / get / delete ---------------------

#[test]
fn put_and_get() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = Engine::open(dir.path(), false)?;

    engine.put(b"name".to_vec(), b"alice".to_vec())?;
    assert_eq!(engine.get(b"name")?, Some(b"alice".to_vec()));
    assert_eq!(engine.len(), 1);
    Ok(())
}

#[test]
fn delete_removes_key() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = Engine::open(dir.path(), false)?;

    engine.put(b"k".to_vec(), b"v".to_vec())?;
    assert!(engine.contains(b"k"));

    engine.delete(b"k".to_vec())?;
    assert!(engine.get(b"k")?.is_none());
    assert!(engine.is_empty());
    Ok(())
}

#[test]
fn delete_missing_key_is_noop() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = open_manual(dir.path());

    engine.put(b"k".to_vec(), b"v".to_vec())?;
    let before = data_file_len(dir.path());

    engine.delete(b"ghost".to_vec())?;
    engine.delete(b"ghost".to_vec())?;

    assert_eq!(data_file_len(dir.path()), before, "no tombstone for absent key");
    assert_eq!(engine.len(), 1);
    Ok(())
}

#[test]
fn overwrite_key() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = open_manual(dir.path());

    engine.put(b"k".to_vec(), b"v1".to_vec())?;
    engine.put(b"k".to_vec(), b"v2".to_vec())?;
    assert_eq!(engine.get(b"k")?, Some(b"v2".to_vec()));
    assert_eq!(engine.len(), 1);
    assert!(engine.dead_bytes() > 0);
    Ok(())
}

#[test]
fn put_after_delete_resurrects() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = Engine::open(dir.path(), false)?;

    engine.put(b"k".to_vec(), b"v1".to_vec())?;
    engine.delete(b"k".to_vec())?;
    engine.put(b"k".to_vec(), b"v2".to_vec())?;
    assert_eq!(engine.get(b"k")?, Some(b"v2".to_vec()));
    Ok(())
}

#[test]
fn empty_value_is_allowed() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = Engine::open(dir.path(), false)?;

    engine.put(b"k".to_vec(), Vec::new())?;
    assert_eq!(engine.get(b"k")?, Some(Vec::new()));
    Ok(())
}

// --------------------- Validation ---------------------

#[test]
fn put_rejects_empty_key() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = Engine::open(dir.path(), false)?;

    let err = engine.put(Vec::new(), b"v".to_vec()).unwrap_err();
    assert!(err.to_string().contains("empty"));
    assert_eq!(data_file_len(dir.path()), 0);
    Ok(())
}

#[test]
fn put_rejects_oversized_key() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = Engine::open(dir.path(), false)?;

    let key = vec![b'k'; MAX_KEY_SIZE + 1];
    assert!(engine.put(key, b"v".to_vec()).is_err());
    Ok(())
}

#[test]
fn put_rejects_oversized_value() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = Engine::open(dir.path(), false)?;

    let value = vec![b'x'; MAX_VALUE_SIZE + 1];
    let err = engine.put(b"k".to_vec(), value).unwrap_err();
    assert!(err.to_string().contains("value too large"));
    assert!(engine.get(b"k")?.is_none());
    Ok(())
}

#[test]
fn delete_rejects_empty_key() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = Engine::open(dir.path(), false)?;
    assert!(engine.delete(Vec::new()).is_err());
    Ok(())
}

// --------------------- Sync ---------------------

#[test]
fn sync_does_not_error() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = Engine::open(dir.path(), false)?;
    engine.put(b"k".to_vec(), b"v".to_vec())?;
    engine.sync()?;
    Ok(())
}

#[test]
fn synced_engine_writes_through() -> Result<()> {
    let dir = tempdir()?;
    let mut engine = Engine::open(dir.path(), true)?;
    engine.put(b"k".to_vec(), b"v".to_vec())?;
    assert_eq!(data_file_len(dir.path()), engine.file_size());
    Ok(())
}
