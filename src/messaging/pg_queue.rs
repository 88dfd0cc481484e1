//! # PostgreSQL Job Queue
//!
//! `job_queue` table backed scheduler and worker queue. Claims use
//! `FOR UPDATE SKIP LOCKED` so concurrent workers never receive the same item;
//! a lock older than the lock timeout is treated as abandoned.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use std::time::Duration;
use tracing::debug;

use super::queue::{JobQueue, QueuedJob};
use super::scheduler::{EnqueueRequest, ResumptionScheduler};
use crate::error::{ResumeError, ResumeResult};

const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_MAX_ATTEMPTS: i32 = 25;

#[derive(Debug, FromRow)]
struct QueuedJobRow {
    id: i64,
    task_identifier: String,
    payload: Value,
    run_at: DateTime<Utc>,
    attempts: i32,
    max_attempts: i32,
}

impl From<QueuedJobRow> for QueuedJob {
    fn from(row: QueuedJobRow) -> Self {
        Self {
            id: row.id,
            task_identifier: row.task_identifier,
            payload: row.payload,
            run_at: row.run_at,
            attempts: row.attempts,
            max_attempts: row.max_attempts,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgJobQueue {
    pool: PgPool,
    lock_timeout: Duration,
    max_attempts: i32,
}

impl PgJobQueue {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    /// Delivery limit for items enqueued without their own
    pub fn with_max_attempts(mut self, max_attempts: i32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

#[async_trait]
impl ResumptionScheduler for PgJobQueue {
    async fn enqueue(&self, request: EnqueueRequest) -> ResumeResult<i64> {
        let job_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO job_queue (task_identifier, payload, run_at, max_attempts)
            VALUES ($1, $2, COALESCE($3, NOW()), $4)
            RETURNING id
            "#,
        )
        .bind(&request.task_identifier)
        .bind(&request.payload)
        .bind(request.run_at)
        .bind(request.max_attempts.unwrap_or(self.max_attempts))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            ResumeError::Scheduler(format!(
                "Failed to enqueue {}: {e}",
                request.task_identifier
            ))
        })?;

        debug!(
            job_id,
            task_identifier = %request.task_identifier,
            run_at = ?request.run_at,
            "Enqueued work item"
        );
        Ok(job_id)
    }
}

#[async_trait]
impl JobQueue for PgJobQueue {
    async fn claim_due(&self, worker_id: &str, limit: usize) -> ResumeResult<Vec<QueuedJob>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = sqlx::query_as::<_, QueuedJobRow>(
            r#"
            WITH due AS (
                SELECT id
                FROM job_queue
                WHERE run_at <= NOW()
                  AND attempts < max_attempts
                  AND (locked_at IS NULL OR locked_at < NOW() - make_interval(secs => $3))
                ORDER BY run_at, id
                LIMIT $2
                FOR UPDATE SKIP LOCKED
            )
            UPDATE job_queue q
            SET locked_at = NOW(),
                locked_by = $1,
                attempts = q.attempts + 1,
                updated_at = NOW()
            FROM due
            WHERE q.id = due.id
            RETURNING q.id, q.task_identifier, q.payload, q.run_at, q.attempts, q.max_attempts
            "#,
        )
        .bind(worker_id)
        .bind(limit)
        .bind(self.lock_timeout.as_secs_f64())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(QueuedJob::from).collect())
    }

    async fn complete(&self, job_id: i64) -> ResumeResult<()> {
        sqlx::query("DELETE FROM job_queue WHERE id = $1")
            .bind(job_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn fail(
        &self,
        job_id: i64,
        error: &str,
        retry_at: Option<DateTime<Utc>>,
    ) -> ResumeResult<()> {
        // Without a retry time the item is exhausted so it is never claimed again.
        sqlx::query(
            r#"
            UPDATE job_queue
            SET last_error = $2,
                run_at = COALESCE($3, run_at),
                attempts = CASE WHEN $3 IS NULL THEN max_attempts ELSE attempts END,
                locked_at = NULL,
                locked_by = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(job_id)
        .bind(error)
        .bind(retry_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
