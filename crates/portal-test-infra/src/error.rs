use thiserror::Error;

#[derive(Debug, Error)]
pub enum TestInfraError {
    /// The container could not be started or inspected.
    #[error("failed to run test container: {0}")]
    Container(#[from] testcontainers::TestcontainersError),

    #[error("failed to open redis connection: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type Result<T, E = TestInfraError> = std::result::Result<T, E>;
