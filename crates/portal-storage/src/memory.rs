use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use portal_core::repository::{ReadRepository, Repository, Result};
use portal_core::{ShortCode, ShortUrl, StorageError};

/// In-memory implementation of [`Repository`] using DashMap.
///
/// Like the MySQL store, rows are never updated or removed, and expired
/// rows are still returned by `get`.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    storage: DashMap<String, ShortUrl>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            storage: DashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<ShortUrl>> {
        Ok(self
            .storage
            .get(code.as_str())
            .map(|entry| entry.value().clone()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, record: &ShortUrl) -> Result<()> {
        match self.storage.entry(record.id.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(record.id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::{SignedDuration, Timestamp};

    fn record(code: &str, url: &str, expire_at: Timestamp) -> ShortUrl {
        ShortUrl {
            id: ShortCode::new_unchecked(code),
            url: url.to_string(),
            expire_at,
        }
    }

    fn in_an_hour() -> Timestamp {
        Timestamp::now() + SignedDuration::from_hours(1)
    }

    #[tokio::test]
    async fn insert_then_get() {
        let repo = InMemoryRepository::new();
        let r = record("abc123", "https://example.com", in_an_hour());

        repo.insert(&r).await.unwrap();

        assert_eq!(repo.get(&r.id).await.unwrap(), Some(r));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let repo = InMemoryRepository::new();
        assert!(repo
            .get(&ShortCode::new_unchecked("nope"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts_and_keeps_original() {
        let repo = InMemoryRepository::new();
        let first = record("abc123", "https://first.example", in_an_hour());
        let second = record("abc123", "https://second.example", in_an_hour());

        repo.insert(&first).await.unwrap();
        let err = repo.insert(&second).await.unwrap_err();

        assert!(matches!(err, StorageError::Conflict(_)));
        assert_eq!(repo.get(&first.id).await.unwrap(), Some(first));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn expired_rows_are_returned_and_never_reused() {
        let repo = InMemoryRepository::new();
        let expired = record(
            "old",
            "https://example.com",
            Timestamp::now() - SignedDuration::from_secs(10),
        );

        repo.insert(&expired).await.unwrap();

        assert_eq!(repo.get(&expired.id).await.unwrap(), Some(expired.clone()));

        let reuse = record("old", "https://other.example", in_an_hour());
        assert!(matches!(
            repo.insert(&reuse).await,
            Err(StorageError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn codes_are_case_sensitive() {
        let repo = InMemoryRepository::new();
        repo.insert(&record("AbC", "https://upper.example", in_an_hour()))
            .await
            .unwrap();
        repo.insert(&record("abc", "https://lower.example", in_an_hour()))
            .await
            .unwrap();

        assert_eq!(repo.len(), 2);
    }
}
