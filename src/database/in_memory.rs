//! # In-Memory Task Store
//!
//! [`TaskStore`] held entirely in process memory, for tests and local runs
//! without PostgreSQL. Applies the same transition guards as the SQL store
//! and counts writes so callers can assert that nothing was persisted.
//!
//! ```rust
//! use execution_resumer::database::{InMemoryTaskStore, TaskStore};
//!
//! # tokio_test::block_on(async {
//! let store = InMemoryTaskStore::new();
//! assert!(store.find_task_with_context("task_1").await.unwrap().is_none());
//! assert_eq!(store.task_writes(), 0);
//! # });
//! ```

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use super::store::TaskStore;
use crate::error::{ResumeError, ResumeResult};
use crate::models::{
    EventLog, Execution, ExecutionFinalization, JobInstance, Organization, RuntimeEnvironment,
    Task, TaskUpdate, TaskWithContext,
};
use crate::state_machine::{
    can_finalize_execution, can_transition_task, ensure_finalization_target, TaskStatus,
};

#[derive(Debug, Default)]
struct StoreState {
    tasks: HashMap<String, Task>,
    executions: HashMap<String, Execution>,
    job_instances: HashMap<String, JobInstance>,
    environments: HashMap<String, RuntimeEnvironment>,
    organizations: HashMap<String, Organization>,
    event_logs: HashMap<String, EventLog>,
    task_writes: usize,
    execution_writes: usize,
}

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    state: Mutex<StoreState>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_task(&self, task: Task) {
        self.state.lock().tasks.insert(task.id.clone(), task);
    }

    pub fn insert_execution(&self, execution: Execution) {
        self.state
            .lock()
            .executions
            .insert(execution.id.clone(), execution);
    }

    pub fn insert_job_instance(&self, job_instance: JobInstance) {
        self.state
            .lock()
            .job_instances
            .insert(job_instance.id.clone(), job_instance);
    }

    pub fn insert_environment(&self, environment: RuntimeEnvironment) {
        self.state
            .lock()
            .environments
            .insert(environment.id.clone(), environment);
    }

    pub fn insert_organization(&self, organization: Organization) {
        self.state
            .lock()
            .organizations
            .insert(organization.id.clone(), organization);
    }

    pub fn insert_event_log(&self, event_log: EventLog) {
        self.state
            .lock()
            .event_logs
            .insert(event_log.id.clone(), event_log);
    }

    pub fn task(&self, task_id: &str) -> Option<Task> {
        self.state.lock().tasks.get(task_id).cloned()
    }

    pub fn execution(&self, execution_id: &str) -> Option<Execution> {
        self.state.lock().executions.get(execution_id).cloned()
    }

    /// Task rows actually changed so far
    pub fn task_writes(&self) -> usize {
        self.state.lock().task_writes
    }

    /// Execution rows actually changed so far
    pub fn execution_writes(&self) -> usize {
        self.state.lock().execution_writes
    }
}

fn missing(entity: &str, id: &str) -> ResumeError {
    ResumeError::Database(format!("{entity} {id} is missing from the store"))
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn find_task_with_context(&self, task_id: &str) -> ResumeResult<Option<TaskWithContext>> {
        let state = self.state.lock();

        let Some(task) = state.tasks.get(task_id).cloned() else {
            return Ok(None);
        };
        let execution = state
            .executions
            .get(&task.execution_id)
            .cloned()
            .ok_or_else(|| ResumeError::execution_not_found(&task.execution_id))?;

        let job_instance = state
            .job_instances
            .get(&execution.job_instance_id)
            .cloned()
            .ok_or_else(|| missing("Job instance", &execution.job_instance_id))?;
        let environment = state
            .environments
            .get(&execution.environment_id)
            .cloned()
            .ok_or_else(|| missing("Environment", &execution.environment_id))?;
        let organization = state
            .organizations
            .get(&execution.organization_id)
            .cloned()
            .ok_or_else(|| missing("Organization", &execution.organization_id))?;
        let event_log = state
            .event_logs
            .get(&execution.event_log_id)
            .cloned()
            .ok_or_else(|| missing("Event log", &execution.event_log_id))?;

        let mut completed_tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|t| t.execution_id == execution.id && t.status == TaskStatus::Completed)
            .cloned()
            .collect();
        completed_tasks.sort_by(|a, b| {
            (a.completed_at.is_none(), a.completed_at, &a.id)
                .cmp(&(b.completed_at.is_none(), b.completed_at, &b.id))
        });

        Ok(Some(TaskWithContext {
            task,
            execution,
            job_instance,
            environment,
            organization,
            event_log,
            completed_tasks,
        }))
    }

    async fn update_task(&self, task_id: &str, update: TaskUpdate) -> ResumeResult<Task> {
        let mut state = self.state.lock();
        let current = state
            .tasks
            .get(task_id)
            .cloned()
            .ok_or_else(|| ResumeError::task_not_found(task_id))?;

        if !can_transition_task(current.status, update.status) {
            return Ok(current);
        }

        let updated = update.apply_to(&current);
        state.tasks.insert(task_id.to_string(), updated.clone());
        state.task_writes += 1;
        Ok(updated)
    }

    async fn update_execution(
        &self,
        execution_id: &str,
        finalization: ExecutionFinalization,
    ) -> ResumeResult<Option<Execution>> {
        ensure_finalization_target(finalization.status)?;

        let mut state = self.state.lock();
        let Some(current) = state.executions.get(execution_id).cloned() else {
            return Ok(None);
        };

        if !can_finalize_execution(current.status, finalization.status) {
            return Ok(None);
        }

        let updated = finalization.apply_to(&current);
        state
            .executions
            .insert(execution_id.to_string(), updated.clone());
        state.execution_writes += 1;
        Ok(Some(updated))
    }
}
