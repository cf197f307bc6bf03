use crate::error::FilterError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, FilterError>;

/// A probabilistic membership test over every short code ever issued.
///
/// Implementations must never return a false negative: `exists` returning
/// `false` means the code was definitely never added.
#[async_trait]
pub trait ExistenceFilter: Send + Sync + 'static {
    /// Registers a newly issued code.
    async fn add(&self, code: &ShortCode) -> Result<()>;

    /// Returns `false` if the code is definitely absent, `true` if it may be present.
    async fn exists(&self, code: &ShortCode) -> Result<bool>;
}
