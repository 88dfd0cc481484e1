use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ResumeResult;

/// A work item claimed by a worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedJob {
    pub id: i64,
    pub task_identifier: String,
    pub payload: Value,
    pub run_at: DateTime<Utc>,
    /// Deliveries so far, including the current one
    pub attempts: i32,
    pub max_attempts: i32,
}

impl QueuedJob {
    pub fn attempts_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

/// Worker side of the work queue.
///
/// A claimed item is invisible to other workers until it is completed,
/// failed, or its lock expires.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Lock up to `limit` due items for `worker_id`, counting one delivery each.
    async fn claim_due(&self, worker_id: &str, limit: usize) -> ResumeResult<Vec<QueuedJob>>;

    /// Remove a successfully handled item.
    async fn complete(&self, job_id: i64) -> ResumeResult<()>;

    /// Release a failed item with its error. With `retry_at` it is redelivered
    /// then; without it the item is left failed and never claimed again.
    async fn fail(
        &self,
        job_id: i64,
        error: &str,
        retry_at: Option<DateTime<Utc>>,
    ) -> ResumeResult<()>;
}
