//! Cache layer
//!
//! Caches catalog reads (categories, products, news, promotions) so repeated
//! page views do not hit the API. It supports:
//! - In-memory cache (moka) - default
//! - Disabled - every read goes to the API
//!
//! The cache driver is selected based on configuration.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{CacheConfig, CacheDriver};

pub use memory::MemoryCache;

/// Cache layer trait
///
/// Generic methods make this trait unusable as `dyn CacheLayer`; use the
/// [`Cache`] enum for runtime selection.
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Get a value from cache
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;

    /// Set a value in cache
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T) -> Result<()>;

    /// Delete every key starting with `prefix`
    async fn delete_prefix(&self, prefix: &str) -> Result<()>;

    /// Clear all cache entries
    async fn clear(&self) -> Result<()>;
}

/// Unified cache enum for runtime polymorphism
#[derive(Debug)]
pub enum Cache {
    /// In-memory cache using moka
    Memory(MemoryCache),
    /// Caching turned off
    Disabled,
}

#[async_trait]
impl CacheLayer for Cache {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        match self {
            Cache::Memory(cache) => cache.get(key).await,
            Cache::Disabled => Ok(None),
        }
    }

    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T) -> Result<()> {
        match self {
            Cache::Memory(cache) => cache.set(key, value).await,
            Cache::Disabled => Ok(()),
        }
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<()> {
        match self {
            Cache::Memory(cache) => cache.delete_prefix(prefix).await,
            Cache::Disabled => Ok(()),
        }
    }

    async fn clear(&self) -> Result<()> {
        match self {
            Cache::Memory(cache) => cache.clear().await,
            Cache::Disabled => Ok(()),
        }
    }
}

/// Create a cache instance based on configuration
pub fn create_cache(config: &CacheConfig) -> Arc<Cache> {
    match config.driver {
        CacheDriver::Memory => {
            let ttl = Duration::from_secs(config.ttl_seconds);
            Arc::new(Cache::Memory(MemoryCache::with_capacity_and_ttl(
                config.max_capacity,
                ttl,
            )))
        }
        CacheDriver::None => Arc::new(Cache::Disabled),
    }
}
