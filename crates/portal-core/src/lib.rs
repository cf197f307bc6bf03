//! Core types and traits for the Portal URL shortener.
//!
//! This crate provides the domain types shared by every other crate and the
//! narrow traits through which the resolution core talks to its collaborators:
//! the cache, the existence filter, the durable store and the token generator.

pub mod cache;
pub mod error;
pub mod filter;
pub mod generator;
pub mod record;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use cache::{CachedUrl, UrlCache};
pub use error::{CacheError, FilterError, GeneratorError, ShortenerError, StorageError};
pub use filter::ExistenceFilter;
pub use generator::TokenGenerator;
pub use record::ShortUrl;
pub use repository::{ReadRepository, Repository};
pub use shortcode::ShortCode;
pub use shortener::Shortener;
