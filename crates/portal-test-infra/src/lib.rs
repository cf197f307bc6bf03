//! Disposable containers for integration tests. All fixtures need a Docker daemon.

mod error;
pub mod mysql;
pub mod redis;

pub use error::{Result, TestInfraError};
