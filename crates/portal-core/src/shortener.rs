use crate::record::ShortUrl;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// The boundary the request layer talks to.
#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Mints a new short code for `url`, valid until `expire_at`.
    async fn shorten(&self, url: String, expire_at: Timestamp) -> Result<ShortUrl>;

    /// Resolves a short code to its live target URL.
    ///
    /// Fails with `NotFound` for codes that were never issued and `Expired`
    /// for codes whose validity window has passed.
    async fn resolve(&self, code: &ShortCode) -> Result<String>;
}
