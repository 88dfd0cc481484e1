//! Schema migrations, embedded from `migrations/` at compile time.
//!
//! Files follow `YYYYMMDDHHMMSS_description.sql`; sqlx records applied
//! versions in `_sqlx_migrations` and takes an advisory lock while running, so
//! several workers starting at once apply each migration exactly once.

use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

use crate::error::ResumeResult;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn run_migrations(pool: &PgPool) -> ResumeResult<()> {
    MIGRATOR.run(pool).await?;
    info!(
        migrations = MIGRATOR.iter().count(),
        "Database schema up to date"
    );
    Ok(())
}
