//! # Models
//!
//! Domain records for executions, their tasks, and the read-only context
//! (job instance, environment, organization, triggering event) a resumption
//! needs. Persistence lives in [`crate::database`].

pub mod environment;
pub mod event_log;
pub mod execution;
pub mod job_instance;
pub mod task;
pub mod task_context;

pub use environment::{Organization, RuntimeEnvironment};
pub use event_log::{ApiEventLog, EventLog};
pub use execution::{Execution, ExecutionFinalization};
pub use job_instance::{Endpoint, Job, JobInstance};
pub use task::{CachedTask, Task, TaskUpdate};
pub use task_context::TaskWithContext;
