//! # Resume Worker
//!
//! Long-running process that drains the `job_queue` table into the task
//! resumer. Configuration comes from `config/resumer*.toml` and `RESUMER__*`
//! environment variables; Ctrl-C stops polling after in-flight items finish.

use anyhow::Context;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

use execution_resumer::client::HttpExecutionClientFactory;
use execution_resumer::config::ConfigLoader;
use execution_resumer::database::{create_pool, run_migrations, PgTaskStore};
use execution_resumer::logging::init_tracing;
use execution_resumer::messaging::PgJobQueue;
use execution_resumer::{ResumeWorker, TaskResumer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ConfigLoader::new()
        .load()
        .context("failed to load resumer configuration")?;

    let pool = create_pool(&config.database)
        .await
        .context("failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("failed to apply database migrations")?;

    let queue = Arc::new(PgJobQueue::new(pool.clone()).with_max_attempts(config.worker.max_attempts));
    let resumer = Arc::new(TaskResumer::new(
        Arc::new(PgTaskStore::new(pool.clone())),
        Arc::new(
            HttpExecutionClientFactory::new(&config.client)
                .context("failed to build the execution client")?,
        ),
        queue.clone(),
    ));
    let worker = ResumeWorker::new(queue, resumer, config.worker.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Shutdown signal received");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for shutdown signal");
                // Keep the sender alive so the worker keeps polling.
                std::future::pending::<()>().await;
            }
        }
    });

    info!(worker_id = %worker.worker_id(), "Starting resume worker");
    worker.run(shutdown_rx).await?;

    pool.close().await;
    Ok(())
}
