use serde::{Deserialize, Serialize};

use super::{EventLog, Execution, JobInstance, Organization, RuntimeEnvironment, Task};

/// A task loaded together with everything needed to replay its execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskWithContext {
    pub task: Task,
    pub execution: Execution,
    pub job_instance: JobInstance,
    pub environment: RuntimeEnvironment,
    pub organization: Organization,
    pub event_log: EventLog,
    /// The execution's tasks whose status was `COMPLETED` at read time
    pub completed_tasks: Vec<Task>,
}
