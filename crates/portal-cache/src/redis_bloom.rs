use async_trait::async_trait;
use portal_core::{filter::Result, ExistenceFilter, FilterError, ShortCode};
use tracing::{trace, warn};

use crate::map_redis_error;

pub const DEFAULT_FILTER_NAME: &str = "url_shortener";

/// An [`ExistenceFilter`] stored in Redis through the RedisBloom module.
///
/// `BF.ADD` creates the filter with the server's default parameters on first use.
#[derive(Clone)]
pub struct RedisBloomFilter {
    conn: redis::aio::MultiplexedConnection,
    name: String,
}

impl RedisBloomFilter {
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self::with_name(conn, DEFAULT_FILTER_NAME)
    }

    pub fn with_name(conn: redis::aio::MultiplexedConnection, name: impl Into<String>) -> Self {
        Self {
            conn,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl ExistenceFilter for RedisBloomFilter {
    async fn add(&self, code: &ShortCode) -> Result<()> {
        trace!(code = %code, filter = %self.name, "BF.ADD");

        let mut conn = self.conn.clone();
        redis::cmd("BF.ADD")
            .arg(&self.name)
            .arg(code.as_str())
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| {
                warn!(code = %code, error = %e, "Failed to add code to RedisBloom");
                map_redis_error::<FilterError>("BF.ADD failed", e)
            })
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let mut conn = self.conn.clone();
        let present = redis::cmd("BF.EXISTS")
            .arg(&self.name)
            .arg(code.as_str())
            .query_async::<bool>(&mut conn)
            .await
            .map_err(|e| {
                warn!(code = %code, error = %e, "Failed to query RedisBloom");
                map_redis_error::<FilterError>("BF.EXISTS failed", e)
            })?;

        trace!(code = %code, present, "BF.EXISTS");
        Ok(present)
    }
}
