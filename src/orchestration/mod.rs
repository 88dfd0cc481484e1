//! # Orchestration
//!
//! Resumption of suspended executions.
//!
//! - [`TaskResumer`]: one resumption, from task lookup to execution outcome
//! - [`ResumeWorker`]: drains the work queue into the resumer
//! - [`resolve_task`]: the pure task transition rule

pub mod resume_worker;
pub mod task_resolution;
pub mod task_resumer;

pub use resume_worker::{PollSummary, ResumeWorker};
pub use task_resolution::{resolve_task, TaskResolution};
pub use task_resumer::{ResumeOutcome, TaskResumer};
