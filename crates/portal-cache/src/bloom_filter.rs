//! In-process Bloom filter implementation of [`ExistenceFilter`].
//!
//! A Bloom filter never reports a false negative: if it says a code was
//! never added, it was never added. It may report a false positive at the
//! configured rate, in which case the caller pays for one store lookup.
//!
//! The filter lives in process memory and is empty after a restart. Pair it
//! with a store whose codes are all re-added on startup, or use
//! [`RedisBloomFilter`](crate::RedisBloomFilter) to share membership across
//! instances.

use async_trait::async_trait;
use parking_lot::RwLock;
use portal_core::{filter::Result, ExistenceFilter, FilterError, ShortCode};
use tracing::trace;
use typed_builder::TypedBuilder;

/// Configuration for the Bloom filter.
#[derive(Debug, Clone, TypedBuilder)]
pub struct BloomFilterConfig {
    /// Expected number of codes to be added.
    ///
    /// Setting this too low will increase the false positive rate.
    #[builder(default = 1_000_000)]
    pub expected_items: usize,

    /// Desired false positive rate as a probability between 0.0 and 1.0.
    #[builder(default = 0.01)]
    pub false_positive_rate: f64,
}

impl Default for BloomFilterConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

pub struct BloomFilter {
    bloom: RwLock<bloomfilter::Bloom<ShortCode>>,
}

impl BloomFilter {
    /// # Errors
    ///
    /// Returns `FilterError::Initialization` if the parameters are rejected.
    pub fn new(config: BloomFilterConfig) -> Result<Self> {
        let bloom =
            bloomfilter::Bloom::new_for_fp_rate(config.expected_items, config.false_positive_rate)
                .map_err(|e| FilterError::Initialization(e.to_string()))?;
        Ok(Self {
            bloom: RwLock::new(bloom),
        })
    }
}

#[async_trait]
impl ExistenceFilter for BloomFilter {
    async fn add(&self, code: &ShortCode) -> Result<()> {
        trace!(code = %code, "Adding code to Bloom filter");
        self.bloom.write().set(code);
        Ok(())
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let present = self.bloom.read().check(code);
        trace!(code = %code, present, "Checked Bloom filter");
        Ok(present)
    }
}
