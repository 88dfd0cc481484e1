use async_trait::async_trait;

use crate::error::ResumeResult;
use crate::models::{Execution, ExecutionFinalization, Task, TaskUpdate, TaskWithContext};

/// Durable record of tasks and executions.
///
/// Every operation is point-keyed. Writes are guarded by the transition rules
/// in [`crate::state_machine::guards`], so concurrent resumptions of the same
/// execution cannot regress a task or overwrite a finalized execution.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Load a task with its execution, job instance, environment,
    /// organization, triggering event, and the execution's completed tasks.
    async fn find_task_with_context(&self, task_id: &str) -> ResumeResult<Option<TaskWithContext>>;

    /// Apply a task resolution. A task already `COMPLETED` is left untouched
    /// and its current row is returned instead.
    async fn update_task(&self, task_id: &str, update: TaskUpdate) -> ResumeResult<Task>;

    /// Finalize an execution that is still `RUNNING`.
    ///
    /// Returns `None` when the execution was not `RUNNING` (already finalized
    /// by a concurrent resumption, or never started); nothing is written then.
    async fn update_execution(
        &self,
        execution_id: &str,
        finalization: ExecutionFinalization,
    ) -> ResumeResult<Option<Execution>>;
}
