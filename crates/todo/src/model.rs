use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single todo entry.
///
/// `id`, `title` and `created_at` are fixed at creation; only `done` changes.
/// The serde field names are the on-disk record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: u64,
    pub title: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(id: u64, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            done: false,
            created_at,
        }
    }

    pub fn toggle_done(&mut self) {
        self.done = !self.done;
    }
}
