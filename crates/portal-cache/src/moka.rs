use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use portal_core::{cache::Result, CachedUrl, ShortCode, UrlCache};
use std::time::{Duration, Instant};
use tracing::{debug, trace};
use typed_builder::TypedBuilder;

#[derive(Debug, Clone)]
struct Entry {
    value: CachedUrl,
    ttl: Duration,
}

/// Expires every entry after the TTL it was created with. Reads and
/// updates never extend it.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// An in-memory [`UrlCache`] backed by Moka.
///
/// Suited to single-node deployments and tests. Entries carry their own TTL.
#[derive(Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, Entry>,
}

/// Configuration for creating a [`MokaUrlCache`].
#[derive(Debug, TypedBuilder)]
pub struct MokaCacheConfig {
    /// Maximum number of entries the cache can hold.
    #[builder(default = 10_000)]
    max_capacity: u64,
}

impl MokaUrlCache {
    /// Creates a cache with a default capacity of 10,000 entries.
    pub fn new() -> Self {
        Self::from(MokaCacheConfig::builder().build())
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        Self::from(MokaCacheConfig::builder().max_capacity(max_capacity).build())
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

impl From<MokaCacheConfig> for MokaUrlCache {
    fn from(config: MokaCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get(&self, code: &ShortCode) -> Result<Option<CachedUrl>> {
        trace!(code = %code, "Fetching URL from Moka cache");

        match self.cache.get(code.as_str()).await {
            Some(entry) => {
                debug!(code = %code, "Cache hit in Moka");
                Ok(Some(entry.value))
            }
            None => {
                trace!(code = %code, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set_if_absent(
        &self,
        code: &ShortCode,
        value: &CachedUrl,
        ttl: Duration,
    ) -> Result<bool> {
        trace!(code = %code, ttl_ms = ttl.as_millis() as u64, "Installing entry in Moka cache");

        let entry = Entry {
            value: value.clone(),
            ttl,
        };
        let installed = self
            .cache
            .entry(code.as_str().to_string())
            .or_insert_with(async move { entry })
            .await
            .is_fresh();

        debug!(code = %code, installed, "Moka set-if-absent completed");
        Ok(installed)
    }
}
