//! Content-addressed memoization cache.
//!
//! Values stored here are pure functions of the object ids embedded in
//! their keys, so entries never need explicit invalidation: only
//! capacity and TTL eviction apply. Concurrent writers racing on the same
//! key write identical bytes, so last-writer-wins is fine.
//!
//! - `MemoryCache`: bounded moka cache with a per-entry TTL
//! - `NoCache`: always misses (tests, or running without memoization)
//!
//! Keys are namespaced and embed `FORMAT_VERSION`; bumping it orphans every
//! previously cached value.

use std::sync::Arc;
use std::time::{Duration, Instant};

use moka::sync::Cache as MokaCache;
use moka::Expiry;
use thiserror::Error;

/// Key namespace shared by every cached value.
pub const NAMESPACE: &str = "git-browse";

/// Bump when the serialized shape of any cached value changes.
pub const FORMAT_VERSION: u32 = 2;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache unavailable: {0}")]
    Unavailable(String),
}

/// Key/value store used purely for memoization.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;
    fn set_with_ttl(&self, key: &str, ttl: Duration, value: Vec<u8>) -> Result<(), CacheError>;
}

/// Build a namespaced, versioned cache key.
pub fn cache_key(kind: &str, parts: &[&str]) -> String {
    let mut key = format!("{}:{}", NAMESPACE, kind);
    for part in parts {
        key.push(':');
        key.push_str(part);
    }
    key.push_str(&format!(":v{}", FORMAT_VERSION));
    key
}

#[derive(Clone)]
struct CachedValue {
    bytes: Arc<Vec<u8>>,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, CachedValue> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedValue,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedValue,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache bounded by entry count, each entry expiring after
/// the TTL it was stored with.
pub struct MemoryCache {
    inner: MokaCache<String, CachedValue>,
}

impl MemoryCache {
    pub fn new(max_entries: u64) -> Self {
        tracing::debug!(capacity = max_entries, "Creating memory cache");
        Self {
            inner: MokaCache::builder()
                .max_capacity(max_entries)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.inner.get(key).map(|v| v.bytes.as_ref().clone()))
    }

    fn set_with_ttl(&self, key: &str, ttl: Duration, value: Vec<u8>) -> Result<(), CacheError> {
        self.inner.insert(
            key.to_string(),
            CachedValue {
                bytes: Arc::new(value),
                ttl,
            },
        );
        Ok(())
    }
}

/// A cache that stores nothing.
pub struct NoCache;

impl Cache for NoCache {
    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(None)
    }

    fn set_with_ttl(&self, _key: &str, _ttl: Duration, _value: Vec<u8>) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Read a key, treating any cache failure as a miss.
pub fn get_or_miss(cache: &dyn Cache, key: &str) -> Option<Vec<u8>> {
    match cache.get(key) {
        Ok(Some(bytes)) => {
            tracing::debug!(key, "Cache hit");
            Some(bytes)
        }
        Ok(None) => {
            tracing::debug!(key, "Cache miss");
            None
        }
        Err(e) => {
            tracing::warn!(key, error = %e, "Cache read failed, recomputing");
            None
        }
    }
}

/// Store a value, logging and dropping any cache failure.
pub fn set_or_warn(cache: &dyn Cache, key: &str, ttl: Duration, value: Vec<u8>) {
    if let Err(e) = cache.set_with_ttl(key, ttl, value) {
        tracing::warn!(key, error = %e, "Cache write failed");
    }
}
