use crate::beanstalk::client::Client;
use crate::error::PoolError;
use crate::models::beanstalk_options::BeanstalkOptions;
use crate::pool::manager::ConnectionManager;
use async_trait::async_trait;
use tracing::debug;

/// Opens beanstalkd clients and treats a non-empty `stats` reply as alive.
pub struct BeanstalkManager {
    options: BeanstalkOptions,
}

impl BeanstalkManager {
    pub fn new(options: BeanstalkOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl ConnectionManager for BeanstalkManager {
    type Connection = Client;

    async fn connect(&self) -> Result<Client, PoolError> {
        Client::connect(&self.options).await
    }

    /// A broken socket or a garbled reply means dead, not failure, so the pool
    /// sheds the connection instead of erroring the caller.
    async fn is_alive(&self, conn: &mut Client) -> Result<bool, PoolError> {
        match conn.stats().await {
            Ok(stats) => Ok(!stats.is_empty()),
            Err(e) => {
                debug!("beanstalk probe failed: addr={}, error={}", self.options.addr, e);
                Ok(false)
            }
        }
    }
}
