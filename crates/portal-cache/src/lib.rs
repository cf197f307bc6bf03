//! Cache and existence filter backends for the resolution core.

pub mod bloom_filter;
pub mod moka;
pub mod redis;
pub mod redis_bloom;

pub use bloom_filter::{BloomFilter, BloomFilterConfig};
pub use moka::MokaUrlCache;
pub use redis::RedisUrlCache;
pub use redis_bloom::RedisBloomFilter;

pub(crate) fn map_redis_error<E>(operation: &str, err: ::redis::RedisError) -> E
where
    E: RedisErrorKind,
{
    let message = format!("{operation}: {err}");
    if message.to_ascii_lowercase().contains("timed out") {
        E::timeout(message)
    } else if err.is_io_error() {
        E::unavailable(message)
    } else {
        E::operation(message)
    }
}

/// Lets [`map_redis_error`] build either a cache or a filter error.
pub(crate) trait RedisErrorKind {
    fn timeout(message: String) -> Self;
    fn unavailable(message: String) -> Self;
    fn operation(message: String) -> Self;
}

impl RedisErrorKind for portal_core::CacheError {
    fn timeout(message: String) -> Self {
        Self::Timeout(message)
    }

    fn unavailable(message: String) -> Self {
        Self::Unavailable(message)
    }

    fn operation(message: String) -> Self {
        Self::Operation(message)
    }
}

impl RedisErrorKind for portal_core::FilterError {
    // Filters have no timeout variant; a slow filter is an unavailable one.
    fn timeout(message: String) -> Self {
        Self::Unavailable(message)
    }

    fn unavailable(message: String) -> Self {
        Self::Unavailable(message)
    }

    fn operation(message: String) -> Self {
        Self::Operation(message)
    }
}
