//! Window Store
//!
//! Reads and writes `RateLimitEntry` records in the shared key/value store.

use serde::{Deserialize, Serialize};

use crate::storage::SharedStore;

/// Persisted state of one fixed window
///
/// Serialized as `{"count": N, "resetTime": <epoch ms>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitEntry {
    /// Requests recorded in the current window
    pub count: u32,

    /// Absolute end of the window (epoch milliseconds)
    #[serde(rename = "resetTime")]
    pub reset_time: i64,
}

impl RateLimitEntry {
    /// A window holding a single request
    pub fn fresh(now: i64, window_millis: i64) -> Self {
        Self {
            count: 1,
            reset_time: now.saturating_add(window_millis),
        }
    }

    /// The window has elapsed (strictly after `reset_time`)
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.reset_time
    }
}

/// Entry accessor for a single limiter key
#[derive(Clone)]
pub struct WindowStore {
    store: SharedStore,
    key: String,
}

impl WindowStore {
    pub fn new(store: SharedStore, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the entry. Missing, unreadable, or unparsable records all read as `None`.
    pub fn load(&self) -> Option<RateLimitEntry> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Rate limit store read failed for {}: {}", self.key, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(
                    "Discarding unparsable rate limit record for {}: {}",
                    self.key,
                    e
                );
                None
            }
        }
    }

    /// Persist the entry; write failures are logged and dropped
    pub fn save(&self, entry: &RateLimitEntry) {
        let json = match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to encode rate limit record for {}: {}", self.key, e);
                return;
            }
        };

        if let Err(e) = self.store.set(&self.key, &json) {
            tracing::warn!("Rate limit store write failed for {}: {}", self.key, e);
        }
    }

    /// Remove the entry; failures are logged and dropped
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            tracing::warn!("Rate limit store delete failed for {}: {}", self.key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};
    use std::sync::Arc;

    #[test]
    fn test_entry_wire_format() {
        let entry = RateLimitEntry {
            count: 2,
            reset_time: 1_700_000_000_000,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"count":2,"resetTime":1700000000000}"#);
    }

    #[test]
    fn test_expiry_is_strict() {
        let entry = RateLimitEntry::fresh(0, 1_000);
        assert!(!entry.is_expired(1_000));
        assert!(entry.is_expired(1_001));
    }

    #[test]
    fn test_load_missing_and_corrupt() {
        let memory = MemoryStore::new();
        let windows = WindowStore::new(Arc::new(memory.clone()), "contact-form-rate-limit");
        assert!(windows.load().is_none());

        memory.set("contact-form-rate-limit", "not-json").unwrap();
        assert!(windows.load().is_none());

        memory
            .set("contact-form-rate-limit", r#"{"count":-1,"resetTime":5}"#)
            .unwrap();
        assert!(windows.load().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let windows = WindowStore::new(Arc::new(MemoryStore::new()), "k");
        let entry = RateLimitEntry::fresh(10, 100);
        windows.save(&entry);
        assert_eq!(windows.load(), Some(entry));

        windows.clear();
        assert!(windows.load().is_none());
    }
}
