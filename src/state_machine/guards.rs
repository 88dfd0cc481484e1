//! Transition guards shared by every store implementation.
//!
//! Tasks only move forward (`PENDING -> RUNNING -> COMPLETED`) and executions
//! are finalized exactly once (`RUNNING -> SUCCESS | FAILURE`).

use super::states::{ExecutionStatus, TaskStatus};
use crate::error::{ResumeError, ResumeResult};

/// Whether a task in `from` may be written with status `to`.
///
/// Re-writing the same non-terminal status is allowed so a resumption without
/// output can be acknowledged more than once.
pub fn can_transition_task(from: TaskStatus, to: TaskStatus) -> bool {
    !from.is_terminal() && to.rank() >= from.rank()
}

/// Whether an execution in `from` may be finalized into `to`.
pub fn can_finalize_execution(from: ExecutionStatus, to: ExecutionStatus) -> bool {
    from == ExecutionStatus::Running && to.is_terminal()
}

/// Reject finalizations whose target is not a terminal status.
pub fn ensure_finalization_target(to: ExecutionStatus) -> ResumeResult<()> {
    if to.is_terminal() {
        Ok(())
    } else {
        Err(ResumeError::StateTransition(format!(
            "Execution can only be finalized into SUCCESS or FAILURE, got {to}"
        )))
    }
}
