//! # In-Memory Job Queue
//!
//! Process-local [`ResumptionScheduler`] and [`JobQueue`] for tests. Keeps a
//! history of every enqueue so callers can assert on what was scheduled.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use super::queue::{JobQueue, QueuedJob};
use super::scheduler::{EnqueueRequest, ResumptionScheduler};
use crate::error::ResumeResult;

const DEFAULT_MAX_ATTEMPTS: i32 = 25;

#[derive(Debug, Clone)]
struct InMemoryItem {
    job: QueuedJob,
    locked_by: Option<String>,
    last_error: Option<String>,
}

#[derive(Debug, Default)]
struct QueueState {
    items: Vec<InMemoryItem>,
    history: Vec<EnqueueRequest>,
    next_id: i64,
}

#[derive(Debug, Default)]
pub struct InMemoryJobQueue {
    state: Mutex<QueueState>,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request passed to `enqueue`, in order
    pub fn enqueued(&self) -> Vec<EnqueueRequest> {
        self.state.lock().history.clone()
    }

    /// Items still held by the queue, failed ones included
    pub fn pending(&self) -> Vec<QueuedJob> {
        self.state.lock().items.iter().map(|i| i.job.clone()).collect()
    }

    pub fn last_error(&self, job_id: i64) -> Option<String> {
        self.state
            .lock()
            .items
            .iter()
            .find(|i| i.job.id == job_id)
            .and_then(|i| i.last_error.clone())
    }
}

#[async_trait]
impl ResumptionScheduler for InMemoryJobQueue {
    async fn enqueue(&self, request: EnqueueRequest) -> ResumeResult<i64> {
        let mut state = self.state.lock();
        state.next_id += 1;
        let id = state.next_id;

        state.items.push(InMemoryItem {
            job: QueuedJob {
                id,
                task_identifier: request.task_identifier.clone(),
                payload: request.payload.clone(),
                run_at: request.run_at.unwrap_or_else(Utc::now),
                attempts: 0,
                max_attempts: request.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            },
            locked_by: None,
            last_error: None,
        });
        state.history.push(request);
        Ok(id)
    }
}

#[async_trait]
impl JobQueue for InMemoryJobQueue {
    async fn claim_due(&self, worker_id: &str, limit: usize) -> ResumeResult<Vec<QueuedJob>> {
        let now = Utc::now();
        let mut state = self.state.lock();

        let mut due: Vec<&mut InMemoryItem> = state
            .items
            .iter_mut()
            .filter(|i| {
                i.locked_by.is_none() && i.job.run_at <= now && !i.job.attempts_exhausted()
            })
            .collect();
        due.sort_by_key(|i| (i.job.run_at, i.job.id));

        Ok(due
            .into_iter()
            .take(limit)
            .map(|item| {
                item.locked_by = Some(worker_id.to_string());
                item.job.attempts += 1;
                item.job.clone()
            })
            .collect())
    }

    async fn complete(&self, job_id: i64) -> ResumeResult<()> {
        self.state.lock().items.retain(|i| i.job.id != job_id);
        Ok(())
    }

    async fn fail(
        &self,
        job_id: i64,
        error: &str,
        retry_at: Option<DateTime<Utc>>,
    ) -> ResumeResult<()> {
        let mut state = self.state.lock();
        if let Some(item) = state.items.iter_mut().find(|i| i.job.id == job_id) {
            item.locked_by = None;
            item.last_error = Some(error.to_string());
            match retry_at {
                Some(retry_at) => item.job.run_at = retry_at,
                None => item.job.attempts = item.job.max_attempts,
            }
        }
        Ok(())
    }
}
