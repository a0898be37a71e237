//! Monotonic ID allocation backed by the `nextid` record.
use anyhow::anyhow;

use crate::codec::{decode_counter, encode_counter};
use crate::keys::COUNTER_KEY;
use crate::{KvBackend, Result, TodoError};

/// The id handed out when no counter has been written yet.
pub const FIRST_ID: u64 = 1;

/// Reads and advances the persisted ID counter.
///
/// Allocation is two steps so the caller can write the item in between:
/// [`next_id`](Self::next_id) peeks, [`advance`](Self::advance) persists
/// `id + 1`. Writing the item first means a crash can at worst hand the same
/// id out again; it can never leave a committed item the counter has already
/// moved past without writing.
///
/// The allocator holds no lock of its own. Callers serialise the pair of
/// calls (the todo store does so under its mutex).
#[derive(Debug, Default, Clone, Copy)]
pub struct IdAllocator;

impl IdAllocator {
    pub fn new() -> Self {
        Self
    }

    /// Returns the id the next item should get.
    ///
    /// A missing counter means nothing was ever allocated. A counter at
    /// `u64::MAX` is refused here so that [`advance`](Self::advance) cannot
    /// overflow after the item has been written.
    pub fn next_id<B: KvBackend + ?Sized>(&self, backend: &B) -> Result<u64> {
        let id = match backend.get(COUNTER_KEY)? {
            None => FIRST_ID,
            Some(raw) => {
                decode_counter(&raw).map_err(|source| TodoError::decode(COUNTER_KEY, source))?
            }
        };

        if id == u64::MAX {
            return Err(TodoError::Storage(anyhow!("todo id space exhausted")));
        }
        Ok(id)
    }

    /// Persists `id + 1` as the next id to hand out.
    pub fn advance<B: KvBackend + ?Sized>(&self, backend: &mut B, id: u64) -> Result<()> {
        let next = id
            .checked_add(1)
            .ok_or_else(|| anyhow!("todo id space exhausted"))?;
        backend.put(COUNTER_KEY, encode_counter(next).to_vec())?;
        Ok(())
    }
}
