#[cfg(feature = "beanstalk")]
pub mod beanstalk;
pub mod error;
pub mod models;
pub mod pool;

pub use error::PoolError;
pub use pool::{ConnectionManager, ConnectionPool};
