//! List assembly: rebuilding the ordered todo list from a full key scan.
use anyhow::anyhow;

use crate::keys::StoreKey;
use crate::store::load_item;
use crate::{Item, KvBackend, Result, TodoError};

/// Scans every key and returns all items sorted by ascending id.
///
/// The counter and unrecognised keys are skipped. A record that fails to
/// decode aborts the whole listing: corrupt data is reported, not hidden.
pub fn assemble<B: KvBackend + ?Sized>(backend: &B) -> Result<Vec<Item>> {
    let mut items = Vec::new();
    let mut failure: Option<TodoError> = None;

    let scanned = backend.fold_keys(&mut |key: &[u8]| {
        match StoreKey::parse(key) {
            Some(StoreKey::Item(_)) => {}
            Some(StoreKey::Counter) => return Ok(()),
            None => {
                tracing::trace!(key = %String::from_utf8_lossy(key), "skipping unrecognised key");
                return Ok(());
            }
        }

        let loaded = load_item(backend, key).and_then(|item| {
            item.ok_or_else(|| {
                TodoError::Storage(anyhow!(
                    "key {:?} disappeared during scan",
                    String::from_utf8_lossy(key)
                ))
            })
        });

        match loaded {
            Ok(item) => {
                items.push(item);
                Ok(())
            }
            Err(e) => {
                failure = Some(e);
                Err(anyhow!("list scan aborted"))
            }
        }
    });

    if let Some(e) = failure {
        return Err(e);
    }
    scanned?;

    items.sort_by_key(|item| item.id);
    Ok(items)
}

/// Number of item keys in the backend. The counter and unrecognised keys do
/// not count.
pub fn count_items<B: KvBackend + ?Sized>(backend: &B) -> Result<usize> {
    let mut count = 0usize;
    backend.fold_keys(&mut |key: &[u8]| {
        if let Some(StoreKey::Item(_)) = StoreKey::parse(key) {
            count += 1;
        }
        Ok(())
    })?;
    Ok(count)
}
