use thiserror::Error;

use crate::codec::CodecError;

/// Everything a todo store operation can fail with.
///
/// The HTTP layer maps these to responses; the store itself never retries.
#[derive(Debug, Error)]
pub enum TodoError {
    /// The list already holds `max_items` items; nothing was written.
    #[error("todo list is full ({max_items} items)")]
    Capacity { max_items: usize },

    #[error("todo {id} not found")]
    NotFound { id: u64 },

    /// A stored payload could not be parsed. Always surfaced, never skipped.
    #[error("corrupt record under key {key:?}")]
    Decode {
        key: String,
        #[source]
        source: CodecError,
    },

    /// The backend failed, or the store lock was poisoned.
    #[error("storage error: {0:#}")]
    Storage(anyhow::Error),
}

impl From<anyhow::Error> for TodoError {
    fn from(e: anyhow::Error) -> Self {
        TodoError::Storage(e)
    }
}

impl TodoError {
    pub(crate) fn decode(key: &[u8], source: CodecError) -> Self {
        TodoError::Decode {
            key: String::from_utf8_lossy(key).into_owned(),
            source,
        }
    }
}

pub type Result<T, E = TodoError> = std::result::Result<T, E>;
