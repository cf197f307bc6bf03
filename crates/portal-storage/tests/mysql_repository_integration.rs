use std::time::Duration;

use jiff::{SignedDuration, Timestamp};
use portal_core::{ReadRepository, Repository, ShortCode, ShortUrl, StorageError};
use portal_storage::MySqlRepository;
use portal_test_infra::mysql::{MySqlServer, MysqlConfig};
use sqlx::mysql::MySqlPoolOptions;

struct Fixture {
    _mysql: MySqlServer,
    repo: MySqlRepository,
}

impl Fixture {
    async fn start() -> Self {
        let mysql = MySqlServer::new(MysqlConfig::builder().build())
            .await
            .expect("start mysql");
        let url = mysql.database_url().await.expect("mysql url");
        let repo = MySqlRepository::new(connect_with_retry(&url).await);

        repo.ensure_schema().await.expect("create schema");

        Self {
            _mysql: mysql,
            repo,
        }
    }
}

async fn connect_with_retry(url: &str) -> sqlx::MySqlPool {
    let mut last_error = None;

    for _ in 0..20 {
        match MySqlPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
        {
            Ok(pool) => return pool,
            Err(err) => {
                last_error = Some(err);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    panic!("failed to connect mysql: {last_error:?}");
}

fn whole_seconds(offset: SignedDuration) -> Timestamp {
    Timestamp::from_second((Timestamp::now() + offset).as_second()).unwrap()
}

fn record(code: &str, url: &str, expire_at: Timestamp) -> ShortUrl {
    ShortUrl {
        id: ShortCode::new_unchecked(code),
        url: url.to_string(),
        expire_at,
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn insert_and_get_record() {
    let fixture = Fixture::start().await;
    let r = record(
        "abc123",
        "https://example.com",
        whole_seconds(SignedDuration::from_hours(1)),
    );

    fixture.repo.insert(&r).await.unwrap();

    assert_eq!(fixture.repo.get(&r.id).await.unwrap(), Some(r));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn get_missing_code_returns_none() {
    let fixture = Fixture::start().await;

    let got = fixture
        .repo
        .get(&ShortCode::new_unchecked("missing"))
        .await
        .unwrap();

    assert!(got.is_none());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn expired_record_is_returned_unchanged() {
    let fixture = Fixture::start().await;
    let r = record(
        "expired",
        "https://example.com/old",
        whole_seconds(SignedDuration::from_secs(-60)),
    );

    fixture.repo.insert(&r).await.unwrap();

    assert_eq!(fixture.repo.get(&r.id).await.unwrap(), Some(r));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn duplicate_insert_is_conflict() {
    let fixture = Fixture::start().await;
    let expire_at = whole_seconds(SignedDuration::from_hours(1));

    fixture
        .repo
        .insert(&record("dup", "https://first.example", expire_at))
        .await
        .unwrap();

    let err = fixture
        .repo
        .insert(&record("dup", "https://second.example", expire_at))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn codes_differing_only_in_case_are_distinct() {
    let fixture = Fixture::start().await;
    let expire_at = whole_seconds(SignedDuration::from_hours(1));

    fixture
        .repo
        .insert(&record("AbC", "https://upper.example", expire_at))
        .await
        .unwrap();
    fixture
        .repo
        .insert(&record("abc", "https://lower.example", expire_at))
        .await
        .unwrap();

    let upper = fixture
        .repo
        .get(&ShortCode::new_unchecked("AbC"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(upper.url, "https://upper.example");
}
