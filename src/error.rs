use thiserror::Error;

/// Represents errors that can occur while building or using a connection pool.
///
/// An empty pool is not an error: `acquire` reports it as `Ok(None)`.
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Probe error: {0}")]
    Probe(String),
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Timeout error: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),
    #[error("Type mismatch: expected {expected}")]
    TypeMismatch { expected: &'static str },
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

#[cfg(feature = "beanstalk")]
impl From<serde_yaml::Error> for PoolError {
    fn from(e: serde_yaml::Error) -> Self {
        PoolError::Protocol(e.to_string())
    }
}
