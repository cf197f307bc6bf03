use async_trait::async_trait;
use jiff::Timestamp;
use portal_core::repository::{ReadRepository, Repository, Result};
use portal_core::{ShortCode, ShortUrl, StorageError};
use sqlx::{MySqlPool, Row};
use tracing::{debug, trace};

/// Schema of the `short_urls` table.
pub const SCHEMA: &str = include_str!("../ddl/mysql/short_urls.sql");

/// MySQL implementation of the repository contract.
///
/// `expire_at` is stored as Unix seconds. Sub-second precision is dropped
/// on insert, so a record read back never outlives the one written.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `short_urls` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("short_urls schema is in place");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn parse_expire_at(seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid expire_at timestamp '{seconds}': {e}"))
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<ShortUrl>> {
        trace!(code = %code, "Selecting short url row");

        let row = sqlx::query(
            r#"
            SELECT url, expire_at
            FROM short_urls
            WHERE id = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let url: String = row.try_get("url").map_err(map_sqlx_error)?;
        let expire_at_raw: i64 = row.try_get("expire_at").map_err(map_sqlx_error)?;

        Ok(Some(ShortUrl {
            id: code.clone(),
            url,
            expire_at: parse_expire_at(expire_at_raw)?,
        }))
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn insert(&self, record: &ShortUrl) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO short_urls (id, url, expire_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(record.id.as_str())
        .bind(record.url.as_str())
        .bind(record.expire_at.as_second())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(record.id.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }
}
