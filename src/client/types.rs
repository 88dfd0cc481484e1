//! Wire types for the `EXECUTE_JOB` call. Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{ApiEventLog, CachedTask};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteJobRequest {
    pub event: ApiEventLog,
    pub job: JobIdentity,
    pub context: RunContext,
    pub tasks: Vec<CachedTask>,
}

/// Job slug and version the endpoint should run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobIdentity {
    pub id: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunContext {
    /// Execution id
    pub id: String,
    pub environment: String,
    pub organization: String,
    pub is_test: bool,
    pub version: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteJobResponse {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub output: Option<Value>,
    #[serde(default)]
    pub task: Option<NextTask>,
}

/// The task the job is now suspended on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextTask {
    pub id: String,
    #[serde(default)]
    pub delay_until: Option<DateTime<Utc>>,
}

/// Error body job endpoints send with non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
    #[serde(default)]
    pub stack: Option<String>,
}
