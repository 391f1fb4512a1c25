//! Address cache stores
//!
//! This module defines the `CacheStore` trait and its two realizations:
//! - `memory`: bounded in-process store (FIFO eviction)
//! - `file`: durable table shared across processes and restarts
//!
//! The resolver only ever talks to a store through the trait, so the
//! realization is picked from configuration via [`StoreBackend`].

pub mod file;
pub mod memory;

use crate::config::CacheConfig;
use crate::constants::cache::MAX_TTL_SECS;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// A cached address for one normalized coordinate key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub address: String,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry expiring `ttl_secs` from now
    pub fn new(key: impl Into<String>, address: impl Into<String>, ttl_secs: u64) -> Self {
        let ttl = chrono::Duration::seconds(ttl_secs.min(MAX_TTL_SECS) as i64);
        Self {
            key: key.into(),
            address: address.into(),
            expires_at: Utc::now() + ttl,
        }
    }

    /// Whether the entry is dead at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the entry is dead right now
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Trait for address cache stores
///
/// Implementations must be thread-safe (Send + Sync); the server shares one
/// store across all in-flight requests.
pub trait CacheStore: Send + Sync {
    /// Store name used in logs (e.g., "memory", "file")
    fn name(&self) -> &'static str;

    /// Look up an entry
    ///
    /// Expired entries are reported as absent whether or not they have been
    /// physically removed yet.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<CacheEntry>>> + Send;

    /// Insert or overwrite the entry for `key`, expiring `ttl_secs` from now
    fn put(
        &self,
        key: &str,
        address: &str,
        ttl_secs: u64,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Store realization selected by configuration
#[derive(Debug)]
pub enum StoreBackend {
    Memory(memory::MemoryStore),
    File(file::FileStore),
}

impl StoreBackend {
    /// Build the store named by `config.backend`
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        match config.backend.as_str() {
            "memory" => Ok(Self::Memory(memory::MemoryStore::new(config.max_entries))),
            "file" => {
                let table = config.table.as_deref().ok_or_else(|| {
                    Error::Config("cache.table is required for the file backend".to_string())
                })?;
                Ok(Self::File(file::FileStore::in_cache_dir(table)?))
            }
            other => Err(Error::Config(format!("Unknown cache backend: {}", other))),
        }
    }
}

impl CacheStore for StoreBackend {
    fn name(&self) -> &'static str {
        match self {
            Self::Memory(store) => store.name(),
            Self::File(store) => store.name(),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        match self {
            Self::Memory(store) => store.get(key).await,
            Self::File(store) => store.get(key).await,
        }
    }

    async fn put(&self, key: &str, address: &str, ttl_secs: u64) -> Result<()> {
        match self {
            Self::Memory(store) => store.put(key, address, ttl_secs).await,
            Self::File(store) => store.put(key, address, ttl_secs).await,
        }
    }
}

/// Information about a store realization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreInfo {
    pub name: String,
    pub description: String,
}

/// List all available store realizations
pub fn available_stores() -> Vec<StoreInfo> {
    vec![
        StoreInfo {
            name: "memory".to_string(),
            description: "Bounded in-process store (lost on restart)".to_string(),
        },
        StoreInfo {
            name: "file".to_string(),
            description: "Durable SQLite table in the user cache directory".to_string(),
        },
    ]
}
