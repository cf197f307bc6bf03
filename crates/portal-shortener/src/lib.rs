//! The resolution core: mints short codes and resolves them through the
//! cache, the existence filter and the durable store.

pub mod config;
pub mod service;
pub mod singleflight;
pub mod ttl;

pub use config::ShortenerConfig;
pub use service::ShortenerService;
pub use singleflight::SingleFlight;
