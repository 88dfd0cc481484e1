//! # Resumption Scheduler
//!
//! Enqueues deferred work items. The only item the resumer produces is
//! [`RESUME_TASK`], which re-enters [`crate::orchestration::TaskResumer`] for
//! the next task an execution announced.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use execution_resumer::messaging::{EnqueueRequest, ResumptionScheduler};
//! use chrono::Utc;
//!
//! # async fn example(scheduler: &dyn ResumptionScheduler) -> Result<(), Box<dyn std::error::Error>> {
//! let request = EnqueueRequest::resume_task("task_2", Some(Utc::now()))?;
//! let job_id = scheduler.enqueue(request).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ResumeResult;

/// Work item identifier that resumes a task by id
pub const RESUME_TASK: &str = "resumeTask";

/// Payload of a [`RESUME_TASK`] item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeTaskPayload {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnqueueRequest {
    pub task_identifier: String,
    pub payload: Value,
    /// Earliest time the item may be dispatched; `None` means immediately
    pub run_at: Option<DateTime<Utc>>,
    /// Overrides the queue's default delivery limit
    pub max_attempts: Option<i32>,
}

impl EnqueueRequest {
    pub fn new(task_identifier: impl Into<String>, payload: Value) -> Self {
        Self {
            task_identifier: task_identifier.into(),
            payload,
            run_at: None,
            max_attempts: None,
        }
    }

    /// Resume `task_id` at `run_at`, or as soon as possible.
    pub fn resume_task(task_id: impl Into<String>, run_at: Option<DateTime<Utc>>) -> ResumeResult<Self> {
        let payload = serde_json::to_value(ResumeTaskPayload { id: task_id.into() })?;
        Ok(Self::new(RESUME_TASK, payload).with_run_at(run_at))
    }

    pub fn with_run_at(mut self, run_at: Option<DateTime<Utc>>) -> Self {
        self.run_at = run_at;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: i32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}

#[async_trait]
pub trait ResumptionScheduler: Send + Sync {
    /// Persist a work item and return its queue id.
    async fn enqueue(&self, request: EnqueueRequest) -> ResumeResult<i64>;
}
