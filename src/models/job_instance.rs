//! Job, endpoint and job instance records. Read-only for the resumer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub slug: String,
}

/// Network location of a deployed job runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: String,
    pub slug: String,
    pub url: String,
}

/// A version of a job bound to the endpoint that serves it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInstance {
    pub id: String,
    pub version: String,
    pub job: Job,
    pub endpoint: Endpoint,
}
