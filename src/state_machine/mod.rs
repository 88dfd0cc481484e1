// State machine module for task and execution lifecycles
//
// Statuses are persisted as plain text columns; the guards here are the single
// definition of which writes are legal, used by both the PostgreSQL and the
// in-memory stores.

pub mod guards;
pub mod states;

pub use guards::{can_finalize_execution, can_transition_task, ensure_finalization_target};
pub use states::{ExecutionStatus, TaskStatus};
