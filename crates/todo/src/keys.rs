//! Key scheme: how items and the ID counter are laid out in the store.
//!
//! | Entity  | Key              |
//! |---------|------------------|
//! | item    | `todo_<decimal>` |
//! | counter | `nextid`         |
//!
//! Anything else is unrecognised and skipped by scans, which leaves room for
//! other record kinds later.

/// Key the ID counter lives under.
pub const COUNTER_KEY: &[u8] = b"nextid";

/// Prefix shared by all item keys.
pub const ITEM_KEY_PREFIX: &str = "todo_";

/// Store key for the item with the given id.
pub fn item_key(id: u64) -> Vec<u8> {
    format!("{ITEM_KEY_PREFIX}{id}").into_bytes()
}

/// A recognised store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKey {
    Item(u64),
    Counter,
}

impl StoreKey {
    /// Classifies a raw key. Returns `None` for keys outside the scheme.
    ///
    /// Item ids must be canonical decimals: `todo_007` and `todo_+7` are not
    /// item keys, so every id has exactly one key.
    pub fn parse(key: &[u8]) -> Option<Self> {
        if key == COUNTER_KEY {
            return Some(StoreKey::Counter);
        }

        let digits = key.strip_prefix(ITEM_KEY_PREFIX.as_bytes())?;
        let canonical = match digits {
            [] => false,
            [b'0'] => true,
            [b'0', ..] => false,
            _ => digits.iter().all(u8::is_ascii_digit),
        };
        if !canonical {
            return None;
        }

        std::str::from_utf8(digits)
            .ok()?
            .parse::<u64>()
            .ok()
            .map(StoreKey::Item)
    }

    pub fn to_bytes(self) -> Vec<u8> {
        match self {
            StoreKey::Item(id) => item_key(id),
            StoreKey::Counter => COUNTER_KEY.to_vec(),
        }
    }
}
