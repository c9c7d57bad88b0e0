use crate::error::PoolError;
use crate::models::env_u64;
use serde::Deserialize;

pub const DEFAULT_CAPACITY: usize = 10;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolOptions {
    pub capacity: usize, // 池中最多保留的连接数
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl PoolOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads `POOL_CAPACITY`, falling back to the default.
    pub fn from_env() -> Result<Self, PoolError> {
        let mut options = Self::default();
        if let Some(capacity) = env_u64("POOL_CAPACITY")? {
            options.capacity = capacity_from_u64(capacity)?;
        }
        Ok(options)
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

fn capacity_from_u64(capacity: u64) -> Result<usize, PoolError> {
    usize::try_from(capacity).map_err(|_| {
        PoolError::InvalidOptions(format!("POOL_CAPACITY {capacity} does not fit in usize"))
    })
}
