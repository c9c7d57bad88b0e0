use connpool::beanstalk::BeanstalkManager;
use connpool::models::beanstalk_options::BeanstalkOptions;
use connpool::models::env_u64;
use connpool::models::pool_options::PoolOptions;
use connpool::pool::ConnectionPool;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

type BeanstalkPool = ConnectionPool<BeanstalkManager>;

async fn use_connection(pool: &BeanstalkPool, task: u64) -> anyhow::Result<()> {
    info!("task {}: pool size={}", task, pool.size());
    let Some(mut conn) = pool.acquire().await? else {
        warn!("task {}: no connection available", task);
        return Ok(());
    };
    let stats = conn.stats().await?;
    info!("task {}: stats keys={}", task, stats.len());
    pool.release(conn).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = BeanstalkOptions::from_env()?;
    let pool_options = PoolOptions::from_env()?;
    let tasks = env_u64("DEMO_TASKS")?.unwrap_or(100);
    let workers = env_u64("DEMO_WORKERS")?.unwrap_or(10).max(1) as usize;

    info!("connecting to {} (capacity={})", options.addr, pool_options.capacity);
    let pool = Arc::new(ConnectionPool::with_options(&pool_options, BeanstalkManager::new(options)).await?);

    let limit = Arc::new(Semaphore::new(workers));
    let mut set = JoinSet::new();
    for task in 0..tasks {
        let pool = pool.clone();
        let permit = limit.clone().acquire_owned().await?;
        set.spawn(async move {
            let result = use_connection(&pool, task).await;
            drop(permit);
            result
        });
    }

    while let Some(joined) = set.join_next().await {
        joined??;
    }

    println!("final pool size: {}", pool.size());

    while let Some(conn) = pool.acquire().await? {
        conn.quit().await?;
    }
    Ok(())
}
