use crate::error::PoolError;
use crate::models::pool_options::PoolOptions;
use crate::pool::manager::ConnectionManager;
use std::any::{Any, type_name};
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// A fixed-capacity pool of live connections.
///
/// The pool is filled once, when it is built. After that it never opens new
/// connections: handles that fail the liveness probe are dropped for good, so the
/// number of pooled connections can only shrink over the pool's lifetime.
///
/// `acquire` and `release` never wait. An empty pool yields `Ok(None)` and a
/// release into a full pool discards the connection.
pub struct ConnectionPool<M: ConnectionManager> {
    capacity: usize,
    idle: Mutex<VecDeque<M::Connection>>,
    manager: M,
}

impl<M: ConnectionManager> ConnectionPool<M> {
    /// Builds the pool and fills it with up to `capacity` live connections.
    ///
    /// Connections that fail the probe are dropped without retry, so the pool may
    /// start with fewer than `capacity` handles. A connect or probe error aborts
    /// construction.
    pub async fn new(capacity: usize, manager: M) -> Result<Self, PoolError> {
        let pool = Self {
            capacity,
            idle: Mutex::new(VecDeque::with_capacity(capacity)),
            manager,
        };
        pool.populate().await?;
        Ok(pool)
    }

    pub async fn with_options(options: &PoolOptions, manager: M) -> Result<Self, PoolError> {
        Self::new(options.capacity, manager).await
    }

    async fn populate(&self) -> Result<(), PoolError> {
        let deficit = self.capacity.saturating_sub(self.size());
        for _ in 0..deficit {
            let mut conn = self.manager.connect().await?;
            if self.manager.is_alive(&mut conn).await? {
                self.try_put(conn);
            } else {
                debug!("populate: new connection failed probe, discarded");
            }
        }

        let size = self.size();
        if size < self.capacity {
            warn!("populate: filled {} of {} slots", size, self.capacity);
        } else {
            debug!("populate: filled {} slots", size);
        }
        Ok(())
    }

    /// Number of connections currently in the pool. A snapshot only: other tasks
    /// may change it right after it is read.
    pub fn size(&self) -> usize {
        self.slots().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    /// Name of the connection type this pool accepts back.
    pub fn connection_type(&self) -> &'static str {
        type_name::<M::Connection>()
    }

    /// Takes a live connection out of the pool.
    ///
    /// Returns `Ok(None)` when the pool is empty, or when the connection taken out
    /// fails the probe; in that case the dead connection is dropped and not
    /// replaced.
    pub async fn acquire(&self) -> Result<Option<M::Connection>, PoolError> {
        let popped = self.slots().pop_front();
        let Some(mut conn) = popped else {
            debug!("acquire: pool is empty");
            return Ok(None);
        };

        if !self.manager.is_alive(&mut conn).await? {
            debug!("acquire: connection failed probe, discarded (size={})", self.size());
            return Ok(None);
        }
        Ok(Some(conn))
    }

    /// Puts a connection back if it is still alive and there is room for it.
    /// Otherwise the connection is dropped.
    pub async fn release(&self, mut conn: M::Connection) -> Result<(), PoolError> {
        if !self.manager.is_alive(&mut conn).await? {
            debug!("release: connection failed probe, discarded");
            return Ok(());
        }
        self.try_put(conn);
        Ok(())
    }

    /// Type-erased variant of [`release`](Self::release).
    ///
    /// Fails with [`PoolError::TypeMismatch`] without touching the pool when `conn`
    /// is not this pool's connection type.
    pub async fn release_any(&self, conn: Box<dyn Any + Send>) -> Result<(), PoolError> {
        match conn.downcast::<M::Connection>() {
            Ok(conn) => self.release(*conn).await,
            Err(_) => Err(PoolError::TypeMismatch {
                expected: self.connection_type(),
            }),
        }
    }

    fn try_put(&self, conn: M::Connection) -> bool {
        let mut idle = self.slots();
        if idle.len() >= self.capacity {
            debug!("pool is full ({}), connection discarded", self.capacity);
            return false;
        }
        idle.push_back(conn);
        true
    }

    fn slots(&self) -> MutexGuard<'_, VecDeque<M::Connection>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Hands out increasing ids; ids listed in `dead` never pass the probe.
    struct SeqManager {
        next: AtomicUsize,
        dead: Vec<usize>,
    }

    #[async_trait]
    impl ConnectionManager for SeqManager {
        type Connection = usize;

        async fn connect(&self) -> Result<usize, PoolError> {
            Ok(self.next.fetch_add(1, Ordering::SeqCst))
        }

        async fn is_alive(&self, conn: &mut usize) -> Result<bool, PoolError> {
            Ok(!self.dead.contains(conn))
        }
    }

    fn manager(dead: Vec<usize>) -> SeqManager {
        SeqManager {
            next: AtomicUsize::new(0),
            dead,
        }
    }

    #[tokio::test]
    async fn test_populate_skips_dead_without_retry() {
        let pool = ConnectionPool::new(4, manager(vec![1, 3])).await.unwrap();
        assert_eq!(pool.size(), 2);
        // exactly `capacity` connect attempts
        assert_eq!(pool.manager().next.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_try_put_respects_capacity() {
        let pool = ConnectionPool::new(1, manager(vec![])).await.unwrap();
        assert!(!pool.try_put(99));
        assert_eq!(pool.size(), 1);
    }

    #[tokio::test]
    async fn test_connection_type() {
        let pool = ConnectionPool::new(0, manager(vec![])).await.unwrap();
        assert_eq!(pool.connection_type(), "usize");
    }
}
