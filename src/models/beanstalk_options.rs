use crate::error::PoolError;
use crate::models::env_u64;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ADDR: &str = "localhost:11300";

/// Settings every beanstalkd connection in a pool is opened with.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BeanstalkOptions {
    /// 格式：host:port
    pub addr: String,
    pub connect_timeout_ms: u64, // 建立连接的超时时间
    pub io_timeout_ms: u64,      // 单次读写的超时时间
}

impl Default for BeanstalkOptions {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            connect_timeout_ms: 3000,
            io_timeout_ms: 3000,
        }
    }
}

impl BeanstalkOptions {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Self::default()
        }
    }

    /// Reads `BEANSTALK_ADDR`, `BEANSTALK_CONNECT_TIMEOUT_MS` and
    /// `BEANSTALK_IO_TIMEOUT_MS`, falling back to the defaults.
    pub fn from_env() -> Result<Self, PoolError> {
        let mut options = Self::default();
        if let Ok(addr) = std::env::var("BEANSTALK_ADDR") {
            options.addr = addr;
        }
        if let Some(ms) = env_u64("BEANSTALK_CONNECT_TIMEOUT_MS")? {
            options.connect_timeout_ms = ms;
        }
        if let Some(ms) = env_u64("BEANSTALK_IO_TIMEOUT_MS")? {
            options.io_timeout_ms = ms;
        }
        Ok(options)
    }

    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.connect_timeout_ms = ms;
        self
    }

    pub fn io_timeout_ms(mut self, ms: u64) -> Self {
        self.io_timeout_ms = ms;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }
}
