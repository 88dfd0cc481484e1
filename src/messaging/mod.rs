//! # Messaging Module
//!
//! PostgreSQL-backed work queue for deferred resumptions. The resumer writes
//! through [`ResumptionScheduler`]; the worker drains it through [`JobQueue`].

pub mod in_memory;
pub mod pg_queue;
pub mod queue;
pub mod scheduler;

pub use in_memory::InMemoryJobQueue;
pub use pg_queue::PgJobQueue;
pub use queue::{JobQueue, QueuedJob};
pub use scheduler::{EnqueueRequest, ResumeTaskPayload, ResumptionScheduler, RESUME_TASK};
