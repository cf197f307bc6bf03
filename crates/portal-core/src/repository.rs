use crate::error::StorageError;
use crate::record::ShortUrl;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, StorageError>;

/// A read-only view of the durable store.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the record for a given short code, expired or not.
    /// Returns `None` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<Option<ShortUrl>>;
}

/// The durable store. Records are insert-only.
#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new record. Returns `Err(StorageError::Conflict)` if the code already exists.
    async fn insert(&self, record: &ShortUrl) -> Result<()>;
}
