use crate::error::CacheError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, CacheError>;

/// A value held in the URL cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CachedUrl {
    /// The code resolves to this URL.
    Live(String),
    /// The code is known not to resolve (expired, or absent from the store).
    ///
    /// Distinct from a cache miss: a tombstone is an answer.
    Tombstone,
}

impl CachedUrl {
    /// Encodes the value for string-valued backends. The tombstone is the empty string.
    pub fn encode(&self) -> &str {
        match self {
            CachedUrl::Live(url) => url,
            CachedUrl::Tombstone => "",
        }
    }

    /// Decodes a value written by [`CachedUrl::encode`].
    pub fn decode(raw: String) -> Self {
        if raw.is_empty() {
            CachedUrl::Tombstone
        } else {
            CachedUrl::Live(raw)
        }
    }
}

/// A cache of resolved URLs keyed by [`ShortCode`].
///
/// Writes are insert-if-absent only: an installed entry is never overwritten
/// and its TTL is never refreshed, it simply falls out when the TTL elapses.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get a cached value.
    ///
    /// Returns `Ok(None)` if the key is not in the cache.
    async fn get(&self, code: &ShortCode) -> Result<Option<CachedUrl>>;

    /// Install `value` under `code` for `ttl` unless the key is already present.
    ///
    /// Returns `true` if this call installed the value.
    async fn set_if_absent(&self, code: &ShortCode, value: &CachedUrl, ttl: Duration)
        -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tombstone_round_trips_through_empty_string() {
        assert_eq!(CachedUrl::Tombstone.encode(), "");
        assert_eq!(CachedUrl::decode(String::new()), CachedUrl::Tombstone);
        assert_eq!(
            CachedUrl::decode("https://example.com".to_string()),
            CachedUrl::Live("https://example.com".to_string())
        );
    }
}
