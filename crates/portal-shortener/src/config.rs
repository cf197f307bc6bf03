use std::time::Duration;
use typed_builder::TypedBuilder;

/// Tunables of the resolution core.
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerConfig {
    /// Base TTL of a cached live URL, before jitter and before capping at
    /// the record's remaining validity.
    #[builder(default = Duration::from_secs(24 * 60 * 60))]
    pub cache_ttl: Duration,

    /// Base TTL of a tombstone for a code the store does not know.
    #[builder(default = Duration::from_secs(5 * 60))]
    pub negative_cache_ttl: Duration,

    /// How long a single `resolve` caller waits for a coalesced store fetch.
    #[builder(default = Duration::from_secs(3))]
    pub lookup_timeout: Duration,

    /// Install the URL in the cache right after it is shortened.
    #[builder(default = true)]
    pub prewarm_cache: bool,

    /// Upper bound on generate-hash-insert rounds when the store reports
    /// that a generated code already exists.
    #[builder(default = 3)]
    pub max_code_attempts: usize,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
