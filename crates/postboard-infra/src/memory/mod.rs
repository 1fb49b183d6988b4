//! In-memory repositories - used when no database is configured, and in tests.
//!
//! Data is lost on process restart.

mod posts;
mod reactions;
mod users;

use std::collections::BTreeMap;

pub use posts::{InMemoryPostFileRepository, InMemoryPostRepository};
pub use reactions::InMemoryReactionRepository;
pub use users::InMemoryUserRepository;

/// Rows keyed by a store-assigned id, numbered from 1.
struct Table<T> {
    rows: BTreeMap<i32, T>,
    last_id: i32,
}

impl<T> Table<T> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }

    /// Id for `id`, allocating a fresh one for unsaved (non-positive) ids.
    fn assign_id(&mut self, id: i32) -> i32 {
        if id > 0 {
            self.last_id = self.last_id.max(id);
            id
        } else {
            self.last_id += 1;
            self.last_id
        }
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}
