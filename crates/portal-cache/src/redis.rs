use async_trait::async_trait;
use portal_core::{cache::Result, CacheError, CachedUrl, ShortCode, UrlCache};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::map_redis_error;

pub const DEFAULT_KEY_PREFIX: &str = "url::";

/// A Redis-based implementation of [`UrlCache`].
///
/// Values are stored as plain strings. The tombstone is the empty string.
#[derive(Clone)]
pub struct RedisUrlCache {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
}

impl RedisUrlCache {
    /// Creates a cache using the default `url::` key prefix.
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_prefix(conn, DEFAULT_KEY_PREFIX)
    }

    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    fn cache_key(&self, code: &ShortCode) -> String {
        format!("{}{}", self.key_prefix, code.as_str())
    }
}

#[async_trait]
impl UrlCache for RedisUrlCache {
    async fn get(&self, code: &ShortCode) -> Result<Option<CachedUrl>> {
        let key = self.cache_key(code);
        trace!(code = %code, "Fetching URL from Redis cache");

        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(raw)) => {
                debug!(code = %code, "Cache hit in Redis");
                Ok(Some(CachedUrl::decode(raw)))
            }
            Ok(None) => {
                trace!(code = %code, "Cache miss in Redis");
                Ok(None)
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Redis error on get");
                Err(map_redis_error::<CacheError>("failed to fetch value from Redis", e))
            }
        }
    }

    async fn set_if_absent(
        &self,
        code: &ShortCode,
        value: &CachedUrl,
        ttl: Duration,
    ) -> Result<bool> {
        let key = self.cache_key(code);
        // PX rejects zero.
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        trace!(code = %code, ttl_ms, "Installing entry in Redis cache");

        let mut conn = self.conn.clone();
        let reply = redis::cmd("SET")
            .arg(&key)
            .arg(value.encode())
            .arg("NX")
            .arg("PX")
            .arg(ttl_ms)
            .query_async::<redis::Value>(&mut conn)
            .await;

        match reply {
            Ok(redis::Value::Nil) => {
                debug!(code = %code, "Key already present in Redis, left untouched");
                Ok(false)
            }
            Ok(_) => {
                debug!(code = %code, "Installed entry in Redis");
                Ok(true)
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Failed to install entry in Redis");
                Err(map_redis_error::<CacheError>("failed to write value to Redis", e))
            }
        }
    }
}
