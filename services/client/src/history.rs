//! services/client/src/history.rs
//!
//! The recent-search list: bounded, most-recent-first, de-duplicated by
//! removing any prior occurrence before prepending.

use crate::adapters::local::{keys, LocalStore};
use crate::error::ClientError;

const MAX_RECENT_SEARCHES: usize = 10;

#[derive(Clone)]
pub struct SearchHistory {
    store: LocalStore,
}

impl SearchHistory {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Records a query at the front of the list. Blank queries are ignored.
    pub fn record(&self, query: &str) -> Result<(), ClientError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }
        let mut recent: Vec<String> = self
            .store
            .get(keys::RECENT_SEARCHES)?
            .unwrap_or_default();
        recent.retain(|entry| entry != query);
        recent.insert(0, query.to_string());
        recent.truncate(MAX_RECENT_SEARCHES);
        self.store.put(keys::RECENT_SEARCHES, &recent)
    }

    pub fn recent(&self) -> Result<Vec<String>, ClientError> {
        Ok(self
            .store
            .get(keys::RECENT_SEARCHES)?
            .unwrap_or_default())
    }
}
