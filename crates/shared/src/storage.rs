use std::cell::RefCell;
use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::{Discovery, PlayerState};

pub const PLAYER_DATA_KEY: &str = "playerData";
pub const OFFLINE_DISCOVERIES_KEY: &str = "offlineDiscoveries";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage is unavailable")]
    Unavailable,

    #[error("failed to write {key}: {message}")]
    Write { key: String, message: String },

    #[error("failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key-value persistence, e.g. the browser's `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and for running without a browser.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Player snapshot and offline discovery queue on top of a [`KeyValueStore`].
/// Unreadable entries are treated as absent rather than as errors.
pub struct GameStorage<S> {
    store: S,
}

impl<S: KeyValueStore> GameStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn save_player(&self, player: &PlayerState) -> Result<(), StorageError> {
        let json = serde_json::to_string(player)?;
        self.store.set(PLAYER_DATA_KEY, &json)
    }

    pub fn load_player(&self) -> Option<PlayerState> {
        let raw = self.store.get(PLAYER_DATA_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(player) => Some(player),
            Err(e) => {
                tracing::warn!("ignoring unreadable {PLAYER_DATA_KEY}: {e}");
                None
            }
        }
    }

    /// Discoveries waiting for a bulk sync, oldest first.
    pub fn pending_discoveries(&self) -> Vec<Discovery> {
        let Some(raw) = self.store.get(OFFLINE_DISCOVERIES_KEY) else {
            return Vec::new();
        };
        match serde_json::from_str(&raw) {
            Ok(queue) => queue,
            Err(e) => {
                tracing::warn!("ignoring unreadable {OFFLINE_DISCOVERIES_KEY}: {e}");
                Vec::new()
            }
        }
    }

    /// Append to the offline queue; returns the new queue length.
    pub fn enqueue_discovery(&self, discovery: &Discovery) -> Result<usize, StorageError> {
        let mut queue = self.pending_discoveries();
        queue.push(discovery.clone());
        self.write_queue(&queue)?;
        Ok(queue.len())
    }

    /// Drop the first `count` queued discoveries after the backend confirmed
    /// them. Entries queued while the sync was in flight are kept. Returns
    /// how many remain.
    pub fn drain_synced(&self, count: usize) -> Result<usize, StorageError> {
        let queue = self.pending_discoveries();
        let remaining = &queue[count.min(queue.len())..];
        if remaining.is_empty() {
            self.store.remove(OFFLINE_DISCOVERIES_KEY)?;
        } else {
            self.write_queue(remaining)?;
        }
        Ok(remaining.len())
    }

    fn write_queue(&self, queue: &[Discovery]) -> Result<(), StorageError> {
        let json = serde_json::to_string(queue)?;
        self.store.set(OFFLINE_DISCOVERIES_KEY, &json)
    }
}
