use crate::error::PoolError;

pub mod pool_options;
#[cfg(feature = "beanstalk")]
pub mod beanstalk_options;

/// Reads a numeric environment variable; unset yields `None`.
pub fn env_u64(key: &str) -> Result<Option<u64>, PoolError> {
    match std::env::var(key) {
        Ok(v) => v
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| PoolError::InvalidOptions(format!("{key} must be a number, got {v:?}"))),
        Err(_) => Ok(None),
    }
}
