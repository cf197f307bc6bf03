use thiserror::Error;

/// Errors raised by cache backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache value is invalid: {0}")]
    InvalidData(String),
    #[error("cache initialization failed: {0}")]
    Initialization(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

/// Errors raised by existence filter backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("filter backend unavailable: {0}")]
    Unavailable(String),
    #[error("filter initialization failed: {0}")]
    Initialization(String),
    #[error("filter operation failed: {0}")]
    Operation(String),
}

/// Errors raised by durable store backends.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("short code already exists: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

/// Errors raised by token generators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("token space exhausted: {0}")]
    Exhausted(String),
    #[error("clock anomaly: {0}")]
    Clock(String),
    #[error("generator state is unavailable: {0}")]
    State(String),
}

/// Errors surfaced by the resolution core to the request layer.
///
/// [`NotFound`](ShortenerError::NotFound) and [`Expired`](ShortenerError::Expired)
/// are business outcomes. Everything else except
/// [`Conflict`](ShortenerError::Conflict) is transient.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortenerError {
    #[error("short code not found")]
    NotFound,
    #[error("short code has expired")]
    Expired,
    #[error("could not allocate a unique short code after {attempts} attempts")]
    Conflict { attempts: usize },
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("generator error: {0}")]
    Generator(#[from] GeneratorError),
    #[error("timed out waiting for lookup")]
    Timeout,
    #[error("in-flight lookup was abandoned")]
    Abandoned,
}

impl ShortenerError {
    /// Whether the error is an I/O, timeout or cancellation failure rather
    /// than a stable business outcome.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ShortenerError::Cache(_)
                | ShortenerError::Filter(_)
                | ShortenerError::Storage(_)
                | ShortenerError::Generator(_)
                | ShortenerError::Timeout
                | ShortenerError::Abandoned
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_outcomes_are_not_transient() {
        assert!(!ShortenerError::NotFound.is_transient());
        assert!(!ShortenerError::Expired.is_transient());
        assert!(!ShortenerError::Conflict { attempts: 3 }.is_transient());
    }

    #[test]
    fn backend_failures_are_transient() {
        let cache: ShortenerError = CacheError::Timeout("get".into()).into();
        let storage: ShortenerError = StorageError::Unavailable("pool".into()).into();
        assert!(cache.is_transient());
        assert!(storage.is_transient());
        assert!(ShortenerError::Timeout.is_transient());
        assert!(ShortenerError::Abandoned.is_transient());
    }
}
