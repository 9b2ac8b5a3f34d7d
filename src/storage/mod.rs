//! Persistent Key/Value Namespace
//!
//! This module provides the client-local string store shared by the form
//! rate limiters and the admin session credentials.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐
//! │ RateLimiter  │   │   Session    │
//! └──────┬───────┘   └──────┬───────┘
//!        │                  │
//!        ▼                  ▼
//! ┌─────────────────────────────────┐
//! │   KeyValueStore (SharedStore)   │
//! │   MemoryStore  |  FileStore     │
//! └─────────────────────────────────┘
//! ```
//!
//! Access is uncoordinated: two processes writing the same file can race and
//! the last writer wins.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::path::PathBuf;
use std::sync::Arc;

/// Errors raised by a key/value backend
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Underlying file could not be read or written
    #[error("Storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored namespace exists but cannot be decoded
    #[error("Storage file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// In-memory map lock was poisoned by a panicking writer
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A flat namespace of string values, keyed by string
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite a value
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key; deleting an absent key is not an error
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// List every key currently stored
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Store handle shared between limiters and the session
pub type SharedStore = Arc<dyn KeyValueStore>;
