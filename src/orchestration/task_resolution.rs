//! # Task Resolution
//!
//! Decides how a resumed task moves forward given an optional output:
//!
//! | task        | output      | result                               |
//! |-------------|-------------|--------------------------------------|
//! | `noop`      | any         | `COMPLETED`, completed now, no output |
//! | not `noop`  | present     | `COMPLETED`, completed now, output    |
//! | not `noop`  | absent/null | `RUNNING`                            |
//!
//! A task that is already `COMPLETED` is left as it is.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{Task, TaskUpdate};
use crate::state_machine::TaskStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum TaskResolution {
    Update(TaskUpdate),
    AlreadyCompleted,
}

pub fn resolve_task(task: &Task, output: Option<Value>) -> TaskResolution {
    resolve_task_at(task, output, Utc::now())
}

pub(crate) fn resolve_task_at(
    task: &Task,
    output: Option<Value>,
    now: DateTime<Utc>,
) -> TaskResolution {
    if task.status == TaskStatus::Completed {
        return TaskResolution::AlreadyCompleted;
    }

    let output = output.filter(|value| !value.is_null());

    let update = if task.noop {
        TaskUpdate {
            status: TaskStatus::Completed,
            completed_at: Some(now),
            output: None,
        }
    } else if let Some(output) = output {
        TaskUpdate {
            status: TaskStatus::Completed,
            completed_at: Some(now),
            output: Some(output),
        }
    } else {
        TaskUpdate {
            status: TaskStatus::Running,
            completed_at: None,
            output: None,
        }
    };

    TaskResolution::Update(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn task(noop: bool, status: TaskStatus) -> Task {
        Task {
            id: "T1".to_string(),
            execution_id: "exec_1".to_string(),
            name: "wait".to_string(),
            idempotency_key: "wait".to_string(),
            parent_id: None,
            status,
            noop,
            output: None,
            started_at: None,
            completed_at: None,
            delay_until: None,
        }
    }

    fn update(resolution: TaskResolution) -> TaskUpdate {
        match resolution {
            TaskResolution::Update(update) => update,
            TaskResolution::AlreadyCompleted => panic!("expected an update"),
        }
    }

    #[test]
    fn test_noop_ignores_output() {
        let now = Utc::now();
        let resolved = update(resolve_task_at(
            &task(true, TaskStatus::Pending),
            Some(json!({"ignored": true})),
            now,
        ));

        assert_eq!(resolved.status, TaskStatus::Completed);
        assert_eq!(resolved.completed_at, Some(now));
        assert!(resolved.output.is_none());
    }

    #[test]
    fn test_output_completes_task() {
        let resolved = update(resolve_task(
            &task(false, TaskStatus::Pending),
            Some(json!({"result": 42})),
        ));

        assert_eq!(resolved.status, TaskStatus::Completed);
        assert!(resolved.completed_at.is_some());
        assert_eq!(resolved.output, Some(json!({"result": 42})));
    }

    #[test]
    fn test_no_output_runs_task() {
        let resolved = update(resolve_task(&task(false, TaskStatus::Pending), None));
        assert_eq!(resolved.status, TaskStatus::Running);
        assert!(resolved.completed_at.is_none());
        assert!(resolved.output.is_none());
    }

    #[test]
    fn test_null_output_counts_as_absent() {
        let resolved = update(resolve_task(
            &task(false, TaskStatus::Running),
            Some(Value::Null),
        ));
        assert_eq!(resolved.status, TaskStatus::Running);
    }

    #[test]
    fn test_completed_task_is_left_alone() {
        assert_eq!(
            resolve_task(&task(false, TaskStatus::Completed), Some(json!(1))),
            TaskResolution::AlreadyCompleted
        );
    }
}
