//! # Execution Client
//!
//! The boundary to job endpoints: one `EXECUTE_JOB` call replays an execution
//! with its triggering event and the tasks that already completed, and the
//! endpoint answers with completion, output, and/or the next task it is
//! suspended on.
//!
//! - [`ExecutionClient`] / [`ExecutionClientFactory`]: the traits the resumer
//!   depends on
//! - [`HttpExecutionClientFactory`]: reqwest-backed implementation
//! - [`ExecutionClientError`]: `Api` failures are reported by the endpoint
//!   itself; every other kind is a delivery problem

pub mod error;
pub mod http;
pub mod traits;
pub mod types;

pub use error::{ClientResult, ExecutionClientError};
pub use http::{HttpExecutionClient, HttpExecutionClientFactory};
pub use traits::{ExecutionClient, ExecutionClientFactory};
pub use types::{ExecuteJobRequest, ExecuteJobResponse, JobIdentity, NextTask, RunContext};
