//! Persistent key-value storage
//!
//! This module provides the client-side key-value store that keeps the session
//! record across restarts. It supports:
//! - File store (JSON object on disk) - default
//! - Memory store - for tests and throwaway sessions
//!
//! The store driver is selected based on configuration. Only the session
//! manager touches the [`SESSION_KEY`] entry.

pub mod file;
pub mod memory;

use anyhow::Result;
use std::sync::Arc;

use crate::config::{StorageConfig, StorageDriver};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key under which the serialized session record is kept
pub const SESSION_KEY: &str = "user";

/// Key-value store trait
///
/// Access is synchronous, each call is atomic with respect to other calls on
/// the same store.
pub trait KeyValueStore: Send + Sync {
    /// Get the raw value stored under a key
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a raw value, overwriting any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}

/// Create a store instance based on configuration
///
/// - `StorageDriver::File` - JSON file at `config.path`, created on first write
/// - `StorageDriver::Memory` - process memory
pub fn create_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>> {
    match config.driver {
        StorageDriver::File => {
            let store = FileStore::open(&config.path)?;
            Ok(Arc::new(store))
        }
        StorageDriver::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
