use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::ResumeResult;

/// Open the shared connection pool.
pub async fn create_pool(config: &DatabaseConfig) -> ResumeResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await?;

    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Database pool ready"
    );
    Ok(pool)
}

pub async fn health_check(pool: &PgPool) -> ResumeResult<bool> {
    let health: i32 = sqlx::query_scalar("SELECT 1").fetch_one(pool).await?;
    Ok(health == 1)
}
