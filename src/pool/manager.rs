use crate::error::PoolError;
use async_trait::async_trait;

/// Creates and checks the connections held by a [`ConnectionPool`].
///
/// The manager's own fields are the fixed construction arguments: every call to
/// `connect` builds a connection from the same settings.
///
/// [`ConnectionPool`]: crate::pool::ConnectionPool
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    type Connection: Send + 'static;

    /// Opens a new connection.
    async fn connect(&self) -> Result<Self::Connection, PoolError>;

    /// Returns `Ok(false)` when the connection can no longer be used.
    ///
    /// Must not leave the connection unusable as a side effect of probing it.
    async fn is_alive(&self, conn: &mut Self::Connection) -> Result<bool, PoolError>;
}
