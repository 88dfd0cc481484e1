//! # Task Model
//!
//! A task is one discrete, resumable step inside an execution. Tasks are created
//! by the initiation path (or by a job endpoint announcing its next wait point)
//! and are only ever moved forward by the resumer.
//!
//! ## Database Schema
//!
//! Maps to the `tasks` table:
//! - `id`: primary key (TEXT)
//! - `execution_id`: owning execution
//! - `status`: `PENDING | RUNNING | COMPLETED`
//! - `noop`: task completes without externally observed output
//! - `output`: JSONB, set when completed (never for noop tasks)
//! - `delay_until`: earliest resumption time announced by the job endpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state_machine::TaskStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub execution_id: String,
    pub name: String,
    pub idempotency_key: String,
    pub parent_id: Option<String>,
    pub status: TaskStatus,
    pub noop: bool,
    pub output: Option<Value>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub delay_until: Option<DateTime<Utc>>,
}

/// Field changes for a task resolution.
///
/// `None` leaves the stored column untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub status: TaskStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub output: Option<Value>,
}

impl TaskUpdate {
    /// Apply the update to an in-memory copy of the task.
    pub fn apply_to(&self, task: &Task) -> Task {
        let mut updated = task.clone();
        updated.status = self.status;
        if let Some(completed_at) = self.completed_at {
            updated.completed_at = Some(completed_at);
        }
        if let Some(output) = &self.output {
            updated.output = Some(output.clone());
        }
        updated
    }
}

/// Projection of a task sent to the job endpoint as replay context, so the
/// remote job can skip steps that already ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedTask {
    pub id: String,
    pub idempotency_key: String,
    pub status: TaskStatus,
    pub noop: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl From<&Task> for CachedTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            idempotency_key: task.idempotency_key.clone(),
            status: task.status,
            noop: task.noop,
            output: task.output.clone(),
            parent_id: task.parent_id.clone(),
        }
    }
}
