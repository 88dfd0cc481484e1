//! # Execution Model
//!
//! One run of a job for an environment. The resumer only moves an execution
//! out of `RUNNING`, into `SUCCESS` or `FAILURE`, and only once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::state_machine::ExecutionStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub id: String,
    pub status: ExecutionStatus,
    pub is_test: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub output: Option<Value>,
    pub job_instance_id: String,
    pub environment_id: String,
    pub organization_id: String,
    pub event_log_id: String,
}

/// Terminal write for an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionFinalization {
    pub status: ExecutionStatus,
    pub completed_at: DateTime<Utc>,
    pub output: Option<Value>,
}

impl ExecutionFinalization {
    pub fn success(output: Option<Value>) -> Self {
        Self {
            status: ExecutionStatus::Success,
            completed_at: Utc::now(),
            output,
        }
    }

    /// Failure record carrying the endpoint's message and diagnostic trace.
    pub fn failure(message: &str, stack: &str) -> Self {
        Self {
            status: ExecutionStatus::Failure,
            completed_at: Utc::now(),
            output: Some(json!({ "message": message, "stack": stack })),
        }
    }

    pub fn apply_to(&self, execution: &Execution) -> Execution {
        let mut updated = execution.clone();
        updated.status = self.status;
        updated.completed_at = Some(self.completed_at);
        if let Some(output) = &self.output {
            updated.output = Some(output.clone());
        }
        updated
    }
}
