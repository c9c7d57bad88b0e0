pub mod connection_pool;
pub mod manager;

pub use connection_pool::ConnectionPool;
pub use manager::ConnectionManager;
