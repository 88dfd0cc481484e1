//! # Resume Worker
//!
//! Drains the work queue into [`TaskResumer`]. Each poll claims up to
//! `batch_size` due items and runs them concurrently; a failed item is
//! released for redelivery with exponential backoff until it runs out of
//! attempts. Unknown item kinds and permanent errors are failed immediately.

use chrono::Utc;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::task_resumer::TaskResumer;
use crate::config::WorkerConfig;
use crate::error::{ResumeError, ResumeResult};
use crate::messaging::{JobQueue, QueuedJob, ResumeTaskPayload, RESUME_TASK};

/// Tally of one poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollSummary {
    pub claimed: usize,
    pub completed: usize,
    pub retried: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disposition {
    Completed,
    Retried,
    Failed,
}

pub struct ResumeWorker {
    worker_id: String,
    queue: Arc<dyn JobQueue>,
    resumer: Arc<TaskResumer>,
    config: WorkerConfig,
}

impl std::fmt::Debug for ResumeWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResumeWorker")
            .field("worker_id", &self.worker_id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ResumeWorker {
    pub fn new(queue: Arc<dyn JobQueue>, resumer: Arc<TaskResumer>, config: WorkerConfig) -> Self {
        Self {
            worker_id: format!("resume-worker-{}", Uuid::new_v4()),
            queue,
            resumer,
            config,
        }
    }

    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Poll until `shutdown` turns true. In-flight items finish first.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> ResumeResult<()> {
        info!(
            worker_id = %self.worker_id,
            batch_size = self.config.batch_size,
            poll_interval_ms = self.config.poll_interval_ms,
            "Resume worker started"
        );

        while !*shutdown.borrow() {
            let idle = match self.run_once().await {
                Ok(summary) => summary.claimed == 0,
                Err(e) => {
                    error!(worker_id = %self.worker_id, error = %e, "Queue poll failed");
                    true
                }
            };

            if idle {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.poll_interval()) => {},
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            debug!("Shutdown sender dropped");
                            break;
                        }
                    }
                }
            }
        }

        info!(worker_id = %self.worker_id, "Resume worker stopped");
        Ok(())
    }

    /// Claim and process one batch of due items.
    pub async fn run_once(&self) -> ResumeResult<PollSummary> {
        let jobs = self
            .queue
            .claim_due(&self.worker_id, self.config.batch_size)
            .await?;

        let mut summary = PollSummary {
            claimed: jobs.len(),
            ..PollSummary::default()
        };
        if jobs.is_empty() {
            return Ok(summary);
        }

        debug!(worker_id = %self.worker_id, claimed = jobs.len(), "Claimed work items");

        let results = join_all(jobs.iter().map(|job| self.process(job))).await;
        for result in results {
            match result? {
                Disposition::Completed => summary.completed += 1,
                Disposition::Retried => summary.retried += 1,
                Disposition::Failed => summary.failed += 1,
            }
        }

        Ok(summary)
    }

    async fn process(&self, job: &QueuedJob) -> ResumeResult<Disposition> {
        let outcome = match self.dispatch(job).await {
            Ok(outcome) => outcome,
            Err(e) => return self.release(job, &e).await,
        };

        debug!(job_id = job.id, outcome = ?outcome, "Work item handled");
        self.queue.complete(job.id).await?;
        Ok(Disposition::Completed)
    }

    async fn dispatch(&self, job: &QueuedJob) -> ResumeResult<super::ResumeOutcome> {
        if job.task_identifier != RESUME_TASK {
            return Err(ResumeError::Validation(format!(
                "Unknown task identifier: {}",
                job.task_identifier
            )));
        }

        let payload: ResumeTaskPayload =
            serde_json::from_value(job.payload.clone()).map_err(|e| {
                ResumeError::Validation(format!("Invalid {RESUME_TASK} payload: {e}"))
            })?;

        self.resumer.resume(&payload.id, None).await
    }

    async fn release(&self, job: &QueuedJob, error: &ResumeError) -> ResumeResult<Disposition> {
        let message = error.to_string();

        if error.is_permanent() || job.attempts_exhausted() {
            error!(
                job_id = job.id,
                task_identifier = %job.task_identifier,
                attempts = job.attempts,
                error = %message,
                "Work item failed permanently"
            );
            self.queue.fail(job.id, &message, None).await?;
            return Ok(Disposition::Failed);
        }

        let delay = self.config.backoff_for(job.attempts);
        let retry_at = Utc::now()
            + chrono::Duration::from_std(delay).unwrap_or_else(|_| chrono::Duration::zero());
        warn!(
            job_id = job.id,
            attempts = job.attempts,
            retry_at = %retry_at,
            error = %message,
            "Work item failed; scheduled for redelivery"
        );
        self.queue.fail(job.id, &message, Some(retry_at)).await?;
        Ok(Disposition::Retried)
    }
}
