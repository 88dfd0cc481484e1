//! # PostgreSQL Task Store
//!
//! sqlx-backed [`TaskStore`]. The context read runs in a single
//! `REPEATABLE READ` transaction so the task, its execution and the completed
//! siblings come from one snapshot. Writes are single conditional `UPDATE`s;
//! the `WHERE` clauses mirror [`crate::state_machine::guards`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use tracing::debug;

use super::store::TaskStore;
use crate::error::{ResumeError, ResumeResult};
use crate::models::{
    Endpoint, EventLog, Execution, ExecutionFinalization, Job, JobInstance, Organization,
    RuntimeEnvironment, Task, TaskUpdate, TaskWithContext,
};
use crate::state_machine::{ensure_finalization_target, TaskStatus};

const TASK_COLUMNS: &str = r#"
    id, execution_id, name, idempotency_key, parent_id, status, noop, output,
    started_at, completed_at, delay_until
"#;

const EXECUTION_COLUMNS: &str = r#"
    id, status, is_test, started_at, completed_at, output,
    job_instance_id, environment_id, organization_id, event_log_id
"#;

#[derive(Debug, FromRow)]
struct TaskRow {
    id: String,
    execution_id: String,
    name: String,
    idempotency_key: String,
    parent_id: Option<String>,
    status: String,
    noop: bool,
    output: Option<Value>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    delay_until: Option<DateTime<Utc>>,
}

impl TryFrom<TaskRow> for Task {
    type Error = ResumeError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            status: row.status.parse().map_err(ResumeError::Database)?,
            id: row.id,
            execution_id: row.execution_id,
            name: row.name,
            idempotency_key: row.idempotency_key,
            parent_id: row.parent_id,
            noop: row.noop,
            output: row.output,
            started_at: row.started_at,
            completed_at: row.completed_at,
            delay_until: row.delay_until,
        })
    }
}

#[derive(Debug, FromRow)]
struct ExecutionRow {
    id: String,
    status: String,
    is_test: bool,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    output: Option<Value>,
    job_instance_id: String,
    environment_id: String,
    organization_id: String,
    event_log_id: String,
}

impl TryFrom<ExecutionRow> for Execution {
    type Error = ResumeError;

    fn try_from(row: ExecutionRow) -> Result<Self, Self::Error> {
        Ok(Execution {
            status: row.status.parse().map_err(ResumeError::Database)?,
            id: row.id,
            is_test: row.is_test,
            started_at: row.started_at,
            completed_at: row.completed_at,
            output: row.output,
            job_instance_id: row.job_instance_id,
            environment_id: row.environment_id,
            organization_id: row.organization_id,
            event_log_id: row.event_log_id,
        })
    }
}

/// Everything joined onto an execution for a resumption
#[derive(Debug, FromRow)]
struct ExecutionContextRow {
    job_version: String,
    job_id: String,
    job_slug: String,
    endpoint_id: String,
    endpoint_slug: String,
    endpoint_url: String,
    environment_slug: String,
    api_key: String,
    organization_slug: String,
    event_name: String,
    event_payload: Value,
    event_context: Option<Value>,
    event_timestamp: DateTime<Utc>,
    event_deliver_at: Option<DateTime<Utc>>,
    event_delivered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn find_task(&self, task_id: &str) -> ResumeResult<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, TaskRow>(&sql)
            .bind(task_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Task::try_from)
            .transpose()
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn find_task_with_context(&self, task_id: &str) -> ResumeResult<Option<TaskWithContext>> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let task_sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let Some(task_row) = sqlx::query_as::<_, TaskRow>(&task_sql)
            .bind(task_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.commit().await?;
            return Ok(None);
        };
        let task = Task::try_from(task_row)?;

        let execution_sql = format!("SELECT {EXECUTION_COLUMNS} FROM executions WHERE id = $1");
        let execution: Execution = sqlx::query_as::<_, ExecutionRow>(&execution_sql)
            .bind(&task.execution_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| ResumeError::execution_not_found(&task.execution_id))?
            .try_into()?;

        let context = sqlx::query_as::<_, ExecutionContextRow>(
            r#"
            SELECT ji.version   AS job_version,
                   j.id         AS job_id,
                   j.slug       AS job_slug,
                   ep.id        AS endpoint_id,
                   ep.slug      AS endpoint_slug,
                   ep.url       AS endpoint_url,
                   env.slug     AS environment_slug,
                   env.api_key  AS api_key,
                   org.slug     AS organization_slug,
                   ev.name      AS event_name,
                   ev.payload   AS event_payload,
                   ev.context   AS event_context,
                   ev.timestamp AS event_timestamp,
                   ev.deliver_at   AS event_deliver_at,
                   ev.delivered_at AS event_delivered_at
            FROM executions e
            JOIN job_instances ji ON ji.id = e.job_instance_id
            JOIN jobs j ON j.id = ji.job_id
            JOIN endpoints ep ON ep.id = ji.endpoint_id
            JOIN runtime_environments env ON env.id = e.environment_id
            JOIN organizations org ON org.id = e.organization_id
            JOIN event_logs ev ON ev.id = e.event_log_id
            WHERE e.id = $1
            "#,
        )
        .bind(&execution.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            ResumeError::Database(format!(
                "Execution {} is missing its job instance, environment, organization or event",
                execution.id
            ))
        })?;

        let completed_sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE execution_id = $1 AND status = $2 \
             ORDER BY completed_at NULLS LAST, id"
        );
        let completed_tasks = sqlx::query_as::<_, TaskRow>(&completed_sql)
            .bind(&execution.id)
            .bind(TaskStatus::Completed.as_str())
            .fetch_all(&mut *tx)
            .await?
            .into_iter()
            .map(Task::try_from)
            .collect::<ResumeResult<Vec<_>>>()?;

        tx.commit().await?;

        debug!(
            task_id = %task.id,
            execution_id = %execution.id,
            completed_tasks = completed_tasks.len(),
            "Loaded task context"
        );

        Ok(Some(TaskWithContext {
            job_instance: JobInstance {
                id: execution.job_instance_id.clone(),
                version: context.job_version,
                job: Job {
                    id: context.job_id,
                    slug: context.job_slug,
                },
                endpoint: Endpoint {
                    id: context.endpoint_id,
                    slug: context.endpoint_slug,
                    url: context.endpoint_url,
                },
            },
            environment: RuntimeEnvironment {
                id: execution.environment_id.clone(),
                slug: context.environment_slug,
                api_key: context.api_key,
            },
            organization: Organization {
                id: execution.organization_id.clone(),
                slug: context.organization_slug,
            },
            event_log: EventLog {
                id: execution.event_log_id.clone(),
                name: context.event_name,
                payload: context.event_payload,
                context: context.event_context,
                timestamp: context.event_timestamp,
                deliver_at: context.event_deliver_at,
                delivered_at: context.event_delivered_at,
            },
            task,
            execution,
            completed_tasks,
        }))
    }

    async fn update_task(&self, task_id: &str, update: TaskUpdate) -> ResumeResult<Task> {
        // Forward-only: never rewrite COMPLETED, never move back to PENDING.
        let sql = format!(
            r#"
            UPDATE tasks
            SET status = $2,
                completed_at = COALESCE($3, completed_at),
                output = COALESCE($4, output),
                updated_at = NOW()
            WHERE id = $1
              AND status <> 'COMPLETED'
              AND ($2 <> 'PENDING' OR status = 'PENDING')
            RETURNING {TASK_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(task_id)
            .bind(update.status.as_str())
            .bind(update.completed_at)
            .bind(update.output)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(row) => Task::try_from(row),
            None => {
                debug!(task_id = %task_id, "Task update skipped by transition guard");
                self.find_task(task_id)
                    .await?
                    .ok_or_else(|| ResumeError::task_not_found(task_id))
            }
        }
    }

    async fn update_execution(
        &self,
        execution_id: &str,
        finalization: ExecutionFinalization,
    ) -> ResumeResult<Option<Execution>> {
        ensure_finalization_target(finalization.status)?;

        let sql = format!(
            r#"
            UPDATE executions
            SET status = $2,
                completed_at = $3,
                output = COALESCE($4, output),
                updated_at = NOW()
            WHERE id = $1
              AND status = 'RUNNING'
            RETURNING {EXECUTION_COLUMNS}
            "#
        );

        sqlx::query_as::<_, ExecutionRow>(&sql)
            .bind(execution_id)
            .bind(finalization.status.as_str())
            .bind(finalization.completed_at)
            .bind(finalization.output)
            .fetch_optional(&self.pool)
            .await?
            .map(Execution::try_from)
            .transpose()
    }
}
