use clap::{ArgAction, Parser, ValueEnum};
use jiff::Timestamp;
use portal_gateway::telemetry::LogFormat;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;

pub const LISTEN_ADDR_ENV: &str = "PORTAL_LISTEN_ADDR";
pub const PUBLIC_BASE_URL_ENV: &str = "PORTAL_PUBLIC_BASE_URL";
pub const STORAGE_BACKEND_ENV: &str = "PORTAL_STORAGE_BACKEND";
pub const MYSQL_DSN_ENV: &str = "PORTAL_MYSQL_DSN";
pub const MYSQL_INIT_SCHEMA_ENV: &str = "PORTAL_MYSQL_INIT_SCHEMA";
pub const CACHE_BACKEND_ENV: &str = "PORTAL_CACHE_BACKEND";
pub const REDIS_URL_ENV: &str = "PORTAL_REDIS_URL";
pub const REDIS_KEY_PREFIX_ENV: &str = "PORTAL_REDIS_KEY_PREFIX";
pub const BLOOM_FILTER_NAME_ENV: &str = "PORTAL_BLOOM_FILTER_NAME";
pub const CACHE_CAPACITY_ENV: &str = "PORTAL_CACHE_CAPACITY";
pub const BLOOM_EXPECTED_ITEMS_ENV: &str = "PORTAL_BLOOM_EXPECTED_ITEMS";
pub const BLOOM_FP_RATE_ENV: &str = "PORTAL_BLOOM_FP_RATE";
pub const CACHE_TTL_ENV: &str = "PORTAL_CACHE_TTL_SECS";
pub const NEGATIVE_CACHE_TTL_ENV: &str = "PORTAL_NEGATIVE_CACHE_TTL_SECS";
pub const LOOKUP_TIMEOUT_ENV: &str = "PORTAL_LOOKUP_TIMEOUT_MS";
pub const PREWARM_CACHE_ENV: &str = "PORTAL_PREWARM_CACHE";
pub const MAX_CODE_ATTEMPTS_ENV: &str = "PORTAL_MAX_CODE_ATTEMPTS";
pub const MACHINE_ID_ENV: &str = "PORTAL_MACHINE_ID";
pub const FLAKE_EPOCH_ENV: &str = "PORTAL_FLAKE_EPOCH";
pub const LOG_FORMAT_ENV: &str = "PORTAL_LOG_FORMAT";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_REDIS_KEY_PREFIX: &str = "url::";
pub const DEFAULT_BLOOM_FILTER_NAME: &str = "url_shortener";
pub const DEFAULT_FLAKE_EPOCH: &str = "2024-01-01T00:00:00Z";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "in-memory")]
    InMemory,
    #[value(name = "mysql")]
    Mysql,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::InMemory => write!(f, "in-memory"),
            StorageBackendArg::Mysql => write!(f, "mysql"),
        }
    }
}

/// Where the URL cache and the existence filter live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CacheBackendArg {
    /// Moka cache and an in-process Bloom filter.
    #[value(name = "in-memory")]
    InMemory,
    /// Redis cache and a RedisBloom filter.
    #[value(name = "redis")]
    Redis,
}

impl Display for CacheBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackendArg::InMemory => write!(f, "in-memory"),
            CacheBackendArg::Redis => write!(f, "redis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => LogFormat::Text,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "portal-gateway")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    /// Base URL that short links are rendered against.
    #[arg(long, env = PUBLIC_BASE_URL_ENV, default_value = DEFAULT_PUBLIC_BASE_URL)]
    pub public_base_url: String,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::InMemory
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = MYSQL_DSN_ENV, required_if_eq("storage", "mysql"))]
    pub mysql_dsn: Option<String>,

    /// Create the `short_urls` table if it does not exist.
    #[arg(long, env = MYSQL_INIT_SCHEMA_ENV)]
    pub mysql_init_schema: bool,

    #[arg(
        long,
        env = CACHE_BACKEND_ENV,
        value_enum,
        default_value_t = CacheBackendArg::InMemory
    )]
    pub cache: CacheBackendArg,

    #[arg(long, env = REDIS_URL_ENV, default_value = DEFAULT_REDIS_URL)]
    pub redis_url: String,

    #[arg(long, env = REDIS_KEY_PREFIX_ENV, default_value = DEFAULT_REDIS_KEY_PREFIX)]
    pub redis_key_prefix: String,

    #[arg(long, env = BLOOM_FILTER_NAME_ENV, default_value = DEFAULT_BLOOM_FILTER_NAME)]
    pub bloom_filter_name: String,

    /// Maximum number of entries held by the in-memory cache.
    #[arg(long, env = CACHE_CAPACITY_ENV, default_value_t = 10_000)]
    pub cache_capacity: u64,

    #[arg(long, env = BLOOM_EXPECTED_ITEMS_ENV, default_value_t = 1_000_000)]
    pub bloom_expected_items: usize,

    #[arg(long, env = BLOOM_FP_RATE_ENV, default_value_t = 0.01)]
    pub bloom_fp_rate: f64,

    #[arg(long, env = CACHE_TTL_ENV, default_value_t = 86_400)]
    pub cache_ttl_secs: u64,

    #[arg(long, env = NEGATIVE_CACHE_TTL_ENV, default_value_t = 300)]
    pub negative_cache_ttl_secs: u64,

    #[arg(long, env = LOOKUP_TIMEOUT_ENV, default_value_t = 3_000)]
    pub lookup_timeout_ms: u64,

    #[arg(
        long,
        env = PREWARM_CACHE_ENV,
        action = ArgAction::Set,
        default_value_t = true
    )]
    pub prewarm_cache: bool,

    #[arg(long, env = MAX_CODE_ATTEMPTS_ENV, default_value_t = 3)]
    pub max_code_attempts: usize,

    /// Must be unique among all running instances.
    #[arg(long, env = MACHINE_ID_ENV, default_value_t = 0)]
    pub machine_id: u16,

    #[arg(long, env = FLAKE_EPOCH_ENV, default_value = DEFAULT_FLAKE_EPOCH)]
    pub flake_epoch: Timestamp,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormatArg::Text)]
    pub log_format: LogFormatArg,
}
