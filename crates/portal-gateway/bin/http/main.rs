mod cli;

use crate::cli::{CacheBackendArg, StorageBackendArg, CLI};
use anyhow::{bail, Context};
use clap::Parser;
use portal_cache::{
    BloomFilter, BloomFilterConfig, MokaUrlCache, RedisBloomFilter, RedisUrlCache,
};
use portal_core::{ExistenceFilter, Repository, Shortener, TokenGenerator, UrlCache};
use portal_flake::FlakeSettings;
use portal_gateway::telemetry::init_tracing;
use portal_generator::FlakeGenerator;
use portal_gateway::{App, AppState};
use portal_shortener::{ShortenerConfig, ShortenerService};
use portal_storage::{InMemoryRepository, MySqlRepository};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::parse();

    init_tracing(config.log_format.into())
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install tracing subscriber")?;

    info!(
        listen_addr = %config.listen_addr,
        public_base_url = %config.public_base_url,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        machine_id = config.machine_id,
        "starting portal gateway"
    );

    let generator = FlakeGenerator::new(
        FlakeSettings::builder()
            .machine_id(config.machine_id)
            .start_epoch(config.flake_epoch)
            .build(),
    )
    .context("failed to initialize flake generator")?;

    let shortener_config = ShortenerConfig::builder()
        .cache_ttl(Duration::from_secs(config.cache_ttl_secs))
        .negative_cache_ttl(Duration::from_secs(config.negative_cache_ttl_secs))
        .lookup_timeout(Duration::from_millis(config.lookup_timeout_ms))
        .prewarm_cache(config.prewarm_cache)
        .max_code_attempts(config.max_code_attempts)
        .build();

    let shortener = match config.storage {
        StorageBackendArg::InMemory => {
            with_cache(&config, InMemoryRepository::new(), generator, shortener_config).await?
        }
        StorageBackendArg::Mysql => {
            if config.cache == CacheBackendArg::InMemory {
                // An empty in-process filter would reject every code already in the table.
                bail!("--storage mysql requires --cache redis");
            }
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .context("mysql dsn is required when storage backend is mysql")?;
            let repository = MySqlRepository::connect(mysql_dsn)
                .await
                .context("failed to connect to mysql")?;
            if config.mysql_init_schema {
                repository
                    .ensure_schema()
                    .await
                    .context("failed to create mysql schema")?;
            }
            with_cache(&config, repository, generator, shortener_config).await?
        }
    };

    serve(&config, shortener).await
}

async fn with_cache<R, G>(
    config: &CLI,
    repository: R,
    generator: G,
    shortener_config: ShortenerConfig,
) -> anyhow::Result<Arc<dyn Shortener>>
where
    R: Repository,
    G: TokenGenerator,
{
    match config.cache {
        CacheBackendArg::InMemory => {
            let cache = MokaUrlCache::with_capacity(config.cache_capacity);
            let filter = BloomFilter::new(
                BloomFilterConfig::builder()
                    .expected_items(config.bloom_expected_items)
                    .false_positive_rate(config.bloom_fp_rate)
                    .build(),
            )
            .context("failed to initialize bloom filter")?;
            Ok(build(repository, cache, filter, generator, shortener_config))
        }
        CacheBackendArg::Redis => {
            let client =
                redis::Client::open(config.redis_url.as_str()).context("invalid redis url")?;
            let conn = client
                .get_multiplexed_async_connection()
                .await
                .context("failed to connect to redis")?;
            let cache = RedisUrlCache::with_prefix(conn.clone(), config.redis_key_prefix.clone());
            let filter = RedisBloomFilter::with_name(conn, config.bloom_filter_name.clone());
            Ok(build(repository, cache, filter, generator, shortener_config))
        }
    }
}

fn build<R, C, F, G>(
    repository: R,
    cache: C,
    filter: F,
    generator: G,
    config: ShortenerConfig,
) -> Arc<dyn Shortener>
where
    R: Repository,
    C: UrlCache,
    F: ExistenceFilter,
    G: TokenGenerator,
{
    Arc::new(ShortenerService::new(
        repository, cache, filter, generator, config,
    ))
}

async fn serve(config: &CLI, shortener: Arc<dyn Shortener>) -> anyhow::Result<()> {
    let router = App::router(AppState::new(shortener, config.public_base_url.clone()));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
