//! services/client/src/adapters/local.rs
//!
//! Directory-backed key/value storage: the client-side analog of browser
//! storage. Every key is one JSON document on disk, and every write is
//! announced on a broadcast channel so other holders of the same store can
//! re-read the key. The broadcast carries no payload and no ordering
//! guarantee beyond "last write observed" — consumers re-read and take
//! whatever is there.

use std::fs;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::broadcast;
use tracing::warn;

use crate::error::ClientError;

/// Well-known keys. Anything else is fair game too; these are the ones the
/// application itself reads and writes.
pub mod keys {
    pub const CURRENT_USER: &str = "current_user";
    pub const ENGAGEMENT: &str = "engagement";
    pub const RECENT_SEARCHES: &str = "recent_searches";
    pub const USERS: &str = "users";
    pub const RECIPES: &str = "recipes";
}

/// Announcement that a key changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub key: String,
}

/// A directory of `<key>.json` documents with change notifications.
///
/// Clones share the event channel, so every holder created from the same
/// `open` call hears every write.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
    events: broadcast::Sender<StoreEvent>,
}

impl LocalStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let (events, _) = broadcast::channel(64);
        Ok(Self { dir, events })
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ClientError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    pub fn put<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ClientError> {
        let raw = serde_json::to_string_pretty(value)?;
        fs::write(self.path_for(key), raw)?;
        self.announce(key);
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<(), ClientError> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
            self.announce(key);
        }
        Ok(())
    }

    /// Subscribes to change announcements for every key in this store.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn announce(&self, key: &str) {
        // Nobody listening is fine.
        if self
            .events
            .send(StoreEvent {
                key: key.to_string(),
            })
            .is_err()
        {
            warn!(key, "store change had no subscribers");
        }
    }
}
