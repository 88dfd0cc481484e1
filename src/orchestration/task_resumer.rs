//! # Task Resumer
//!
//! Drives one resumption of a suspended execution:
//!
//! 1. Load the task with its execution context
//! 2. Resolve the task (`RUNNING` or `COMPLETED`) and persist it
//! 3. Replay the execution on its job endpoint with the completed tasks
//! 4. Record what the endpoint answered: completion finalizes the execution as
//!    `SUCCESS`, a next task is scheduled, an endpoint-reported failure
//!    finalizes it as `FAILURE`
//!
//! The endpoint is called exactly once per invocation. Failures to reach it
//! are returned to the caller, whose queue redelivers the work item.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use execution_resumer::client::HttpExecutionClientFactory;
//! use execution_resumer::config::ClientConfig;
//! use execution_resumer::database::PgTaskStore;
//! use execution_resumer::messaging::PgJobQueue;
//! use execution_resumer::orchestration::TaskResumer;
//! use serde_json::json;
//!
//! # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let resumer = TaskResumer::new(
//!     Arc::new(PgTaskStore::new(pool.clone())),
//!     Arc::new(HttpExecutionClientFactory::new(&ClientConfig::default())?),
//!     Arc::new(PgJobQueue::new(pool)),
//! );
//!
//! let outcome = resumer.resume("task_123", Some(json!({"approved": true}))).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{instrument, warn};

use crate::client::{
    ExecuteJobRequest, ExecuteJobResponse, ExecutionClientError, ExecutionClientFactory,
    JobIdentity, RunContext,
};
use crate::database::TaskStore;
use crate::error::{ResumeError, ResumeResult};
use crate::messaging::{EnqueueRequest, ResumptionScheduler};
use crate::models::{ApiEventLog, CachedTask, Execution, ExecutionFinalization, Task, TaskWithContext};
use crate::orchestration::task_resolution::{resolve_task, TaskResolution};
use crate::state_machine::ExecutionStatus;
use crate::validation::{parse_event_log, validate_task_output};
use crate::{log_execution, log_task};

/// What a resumption did to the execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResumeOutcome {
    /// The endpoint reported completion; the execution is now `SUCCESS`
    Completed,
    /// The endpoint suspended on another task, which is queued
    Scheduled {
        task_id: String,
        run_at: Option<DateTime<Utc>>,
    },
    /// The endpoint neither completed nor named a next task
    Suspended,
    /// The endpoint reported a failure; the execution is now `FAILURE`
    Failed { message: String },
    /// The execution was already finalized; nothing was done
    AlreadyFinalized,
}

pub struct TaskResumer {
    store: Arc<dyn TaskStore>,
    clients: Arc<dyn ExecutionClientFactory>,
    scheduler: Arc<dyn ResumptionScheduler>,
}

impl std::fmt::Debug for TaskResumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskResumer").finish_non_exhaustive()
    }
}

impl TaskResumer {
    pub fn new(
        store: Arc<dyn TaskStore>,
        clients: Arc<dyn ExecutionClientFactory>,
        scheduler: Arc<dyn ResumptionScheduler>,
    ) -> Self {
        Self {
            store,
            clients,
            scheduler,
        }
    }

    /// Resume `task_id`, optionally completing it with `output`.
    ///
    /// Returns `NotFound` when the task does not exist, `StateTransition` when
    /// the execution has not started running, and `Validation` when the stored
    /// output or the event is unusable. Endpoint-reported failures
    /// are recorded on the execution and return `Ok(ResumeOutcome::Failed)`.
    #[instrument(skip_all, fields(task_id = %task_id))]
    pub async fn resume(&self, task_id: &str, output: Option<Value>) -> ResumeResult<ResumeOutcome> {
        let context = self
            .store
            .find_task_with_context(task_id)
            .await?
            .ok_or_else(|| ResumeError::task_not_found(task_id))?;

        if context.execution.status.is_terminal() {
            log_execution!(
                info,
                "ALREADY_FINALIZED",
                execution_id: context.execution.id,
                status: context.execution.status,
                task_id: task_id
            );
            return Ok(ResumeOutcome::AlreadyFinalized);
        }

        // Only a running execution can be finalized with whatever the endpoint answers
        if context.execution.status != ExecutionStatus::Running {
            return Err(ResumeError::StateTransition(format!(
                "Execution {} is {}, expected {}",
                context.execution.id,
                context.execution.status,
                ExecutionStatus::Running
            )));
        }

        let resolved = match resolve_task(&context.task, output) {
            TaskResolution::Update(update) => {
                if let Some(output) = &update.output {
                    validate_task_output(output)?;
                }
                self.store.update_task(task_id, update).await?
            }
            TaskResolution::AlreadyCompleted => context.task.clone(),
        };
        log_task!(
            debug,
            "RESOLVED",
            task_id: resolved.id,
            status: resolved.status,
            noop: resolved.noop
        );

        let client = self
            .clients
            .client_for(
                &context.environment.api_key,
                &context.job_instance.endpoint.url,
            )
            .map_err(|e| match e {
                ExecutionClientError::Configuration(message) => {
                    ResumeError::Configuration(message)
                }
                other => ResumeError::Client(other),
            })?;

        let event = parse_event_log(&context.event_log)?;
        let request = build_request(&context, event, &resolved);

        match client.execute_job(&request).await {
            Ok(response) => self.apply_response(&context.execution, response).await,
            Err(ExecutionClientError::Api { message, stack, .. }) => {
                self.record_failure(&context.execution, message, stack).await
            }
            Err(error) => {
                warn!(
                    execution_id = %context.execution.id,
                    error = %error,
                    "Job endpoint unreachable; leaving execution running"
                );
                Err(error.into())
            }
        }
    }

    async fn apply_response(
        &self,
        execution: &Execution,
        response: ExecuteJobResponse,
    ) -> ResumeResult<ResumeOutcome> {
        if response.completed {
            if let Some(next) = &response.task {
                warn!(
                    execution_id = %execution.id,
                    next_task_id = %next.id,
                    "Endpoint reported completion and a next task; not scheduling the task"
                );
            }

            let output = response.output.filter(|o| !o.is_null());
            return match self
                .store
                .update_execution(&execution.id, ExecutionFinalization::success(output))
                .await?
            {
                Some(finalized) => {
                    log_execution!(
                        info,
                        "SUCCESS",
                        execution_id: finalized.id,
                        completed_at: finalized.completed_at
                    );
                    Ok(ResumeOutcome::Completed)
                }
                None => Ok(self.lost_finalize_race(execution)),
            };
        }

        if let Some(next) = response.task {
            let request = EnqueueRequest::resume_task(next.id.clone(), next.delay_until)?;
            let job_id = self.scheduler.enqueue(request).await?;
            log_task!(
                info,
                "SCHEDULED",
                task_id: next.id,
                execution_id: execution.id,
                run_at: next.delay_until,
                job_id: job_id
            );
            return Ok(ResumeOutcome::Scheduled {
                task_id: next.id,
                run_at: next.delay_until,
            });
        }

        log_execution!(debug, "SUSPENDED", execution_id: execution.id);
        Ok(ResumeOutcome::Suspended)
    }

    async fn record_failure(
        &self,
        execution: &Execution,
        message: String,
        stack: String,
    ) -> ResumeResult<ResumeOutcome> {
        let finalization = ExecutionFinalization::failure(&message, &stack);

        match self
            .store
            .update_execution(&execution.id, finalization)
            .await?
        {
            Some(finalized) => {
                log_execution!(
                    warn,
                    "FAILURE",
                    execution_id: finalized.id,
                    message: message
                );
                Ok(ResumeOutcome::Failed { message })
            }
            None => Ok(self.lost_finalize_race(execution)),
        }
    }

    fn lost_finalize_race(&self, execution: &Execution) -> ResumeOutcome {
        warn!(
            execution_id = %execution.id,
            "Execution no longer running; another resumption finalized it first"
        );
        ResumeOutcome::AlreadyFinalized
    }
}

/// Replay context: the completed tasks plus the task just resolved, which
/// replaces any stale copy of itself.
fn replay_cache(completed: &[Task], resolved: &Task) -> Vec<CachedTask> {
    completed
        .iter()
        .filter(|t| t.id != resolved.id)
        .chain(std::iter::once(resolved))
        .map(CachedTask::from)
        .collect()
}

fn build_request(context: &TaskWithContext, event: ApiEventLog, resolved: &Task) -> ExecuteJobRequest {
    let job_instance = &context.job_instance;
    let execution = &context.execution;

    ExecuteJobRequest {
        event,
        job: JobIdentity {
            id: job_instance.job.slug.clone(),
            version: job_instance.version.clone(),
        },
        context: RunContext {
            id: execution.id.clone(),
            environment: context.environment.slug.clone(),
            organization: context.organization.slug.clone(),
            is_test: execution.is_test,
            version: job_instance.version.clone(),
            started_at: execution.started_at.unwrap_or_else(Utc::now),
        },
        tasks: replay_cache(&context.completed_tasks, resolved),
    }
}
