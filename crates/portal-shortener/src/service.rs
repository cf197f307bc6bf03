use crate::config::ShortenerConfig;
use crate::singleflight::SingleFlight;
use crate::ttl;
use async_trait::async_trait;
use jiff::Timestamp;
use portal_core::{
    CachedUrl, ExistenceFilter, Repository, ShortCode, ShortUrl, Shortener, ShortenerError,
    StorageError, TokenGenerator, UrlCache,
};
use portal_generator::Base62Hasher;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, trace, warn};

type Result<T> = std::result::Result<T, ShortenerError>;

/// The resolution core.
///
/// Reads go cache, then existence filter, then one coalesced store fetch
/// per code. Every cache write is insert-if-absent.
pub struct ShortenerService<R, C, F, G> {
    repository: Arc<R>,
    cache: Arc<C>,
    filter: Arc<F>,
    generator: Arc<G>,
    hasher: Base62Hasher,
    config: ShortenerConfig,
    flights: SingleFlight<Result<String>>,
}

impl<R, C, F, G> Clone for ShortenerService<R, C, F, G> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            filter: Arc::clone(&self.filter),
            generator: Arc::clone(&self.generator),
            hasher: self.hasher.clone(),
            config: self.config.clone(),
            flights: self.flights.clone(),
        }
    }
}

impl<R, C, F, G> ShortenerService<R, C, F, G>
where
    R: Repository,
    C: UrlCache,
    F: ExistenceFilter,
    G: TokenGenerator,
{
    pub fn new(repository: R, cache: C, filter: F, generator: G, config: ShortenerConfig) -> Self {
        Self {
            repository: Arc::new(repository),
            cache: Arc::new(cache),
            filter: Arc::new(filter),
            generator: Arc::new(generator),
            hasher: Base62Hasher::default(),
            config,
            flights: SingleFlight::new(),
        }
    }

    /// Replaces the default 7-character hasher.
    pub fn with_hasher(mut self, hasher: Base62Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn config(&self) -> &ShortenerConfig {
        &self.config
    }

    /// Store fetch and cache population, run once per coalesced flight.
    async fn load(&self, code: &ShortCode) -> Result<String> {
        trace!(code = %code, "Fetching record from store");

        let Some(record) = self.repository.get(code).await? else {
            debug!(code = %code, "Code passed the filter but is not in the store");
            let ttl = ttl::jitter(self.config.negative_cache_ttl);
            self.install(code, &CachedUrl::Tombstone, ttl).await;
            return Err(ShortenerError::NotFound);
        };

        let Some(remaining) = record.remaining_at(Timestamp::now()) else {
            debug!(code = %code, expire_at = %record.expire_at, "Record has expired");
            // Expiry is permanent, so the tombstone can live as long as a live entry.
            let ttl = ttl::jitter(self.config.cache_ttl);
            self.install(code, &CachedUrl::Tombstone, ttl).await;
            return Err(ShortenerError::Expired);
        };

        let ttl = ttl::live_ttl(self.config.cache_ttl, remaining);
        self.install(code, &CachedUrl::Live(record.url.clone()), ttl).await;

        debug!(code = %code, url = %record.url, "Resolved from store");
        Ok(record.url)
    }

    /// Insert-if-absent into the cache. Failures only cost a future store
    /// lookup, so they are logged and swallowed.
    async fn install(&self, code: &ShortCode, value: &CachedUrl, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }

        match self.cache.set_if_absent(code, value, ttl).await {
            Ok(true) => {
                debug!(code = %code, ttl_ms = ttl.as_millis() as u64, "Cache entry installed")
            }
            Ok(false) => trace!(code = %code, "Cache entry already present"),
            Err(e) => warn!(code = %code, error = %e, "Failed to populate cache"),
        }
    }

    /// Makes a freshly persisted record resolvable.
    async fn publish(&self, record: &ShortUrl) -> Result<()> {
        if let Err(e) = self.filter.add(&record.id).await {
            // The row is persisted but unreachable. It is never resolved and,
            // being insert-only, never handed out again.
            error!(code = %record.id, error = %e, "Failed to register code with existence filter");
            return Err(e.into());
        }

        if self.config.prewarm_cache {
            if let Some(remaining) = record.remaining_at(Timestamp::now()) {
                let ttl = ttl::live_ttl(self.config.cache_ttl, remaining);
                self.install(&record.id, &CachedUrl::Live(record.url.clone()), ttl)
                    .await;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl<R, C, F, G> Shortener for ShortenerService<R, C, F, G>
where
    R: Repository,
    C: UrlCache,
    F: ExistenceFilter,
    G: TokenGenerator,
{
    async fn shorten(&self, url: String, expire_at: Timestamp) -> Result<ShortUrl> {
        // Stores keep expiry at whole-second resolution.
        let expire_at = Timestamp::from_second(expire_at.as_second()).unwrap_or(expire_at);
        let attempts = self.config.max_code_attempts.max(1);

        for attempt in 1..=attempts {
            let token = self.generator.next_token()?;
            let record = ShortUrl {
                id: self.hasher.derive(token, &url),
                url: url.clone(),
                expire_at,
            };

            match self.repository.insert(&record).await {
                Ok(()) => {
                    self.publish(&record).await?;
                    debug!(code = %record.id, url = %record.url, "Shortened URL");
                    return Ok(record);
                }
                Err(StorageError::Conflict(code)) => {
                    warn!(code = %code, attempt, "Generated code already exists");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ShortenerError::Conflict { attempts })
    }

    async fn resolve(&self, code: &ShortCode) -> Result<String> {
        trace!(code = %code, "Resolving short code");

        match self.cache.get(code).await? {
            Some(CachedUrl::Live(url)) => {
                debug!(code = %code, "Cache hit");
                return Ok(url);
            }
            Some(CachedUrl::Tombstone) => {
                debug!(code = %code, "Cached tombstone");
                return Err(ShortenerError::Expired);
            }
            None => trace!(code = %code, "Cache miss"),
        }

        if !self.filter.exists(code).await? {
            debug!(code = %code, "Rejected by existence filter");
            return Err(ShortenerError::NotFound);
        }

        let flight = self.flights.join(code.as_str(), || {
            let this = self.clone();
            let code = code.clone();
            async move { this.load(&code).await }
        });

        match tokio::time::timeout(self.config.lookup_timeout, flight.wait()).await {
            Ok(Some(result)) => result,
            Ok(None) => {
                warn!(code = %code, "In-flight lookup was abandoned");
                Err(ShortenerError::Abandoned)
            }
            Err(_) => {
                warn!(code = %code, "Timed out waiting for lookup");
                Err(ShortenerError::Timeout)
            }
        }
    }
}
