//! Fixtures for resumer tests: one running execution with its job instance,
//! environment, organization and triggering event, backed by the in-memory
//! store and queue.

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

use execution_resumer::config::WorkerConfig;
use execution_resumer::database::InMemoryTaskStore;
use execution_resumer::messaging::InMemoryJobQueue;
use execution_resumer::models::{
    Endpoint, EventLog, Execution, Job, JobInstance, Organization, RuntimeEnvironment, Task,
};
use execution_resumer::{ExecutionStatus, ResumeWorker, TaskResumer, TaskStatus};

use super::RecordingClientFactory;

pub const EXECUTION_ID: &str = "exec_1";
pub const EVENT_ID: &str = "evt_1";
pub const API_KEY: &str = "sk_test_abc123";
pub const ENDPOINT_URL: &str = "https://jobs.acme.dev/api/trigger";
pub const JOB_SLUG: &str = "welcome-email";
pub const JOB_VERSION: &str = "1.2.0";
pub const ENVIRONMENT_SLUG: &str = "dev";
pub const ORGANIZATION_SLUG: &str = "acme";

pub fn execution_started_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap()
}

/// Builder for tasks belonging to the fixture execution
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            task: Task {
                id: id.to_string(),
                execution_id: EXECUTION_ID.to_string(),
                name: format!("{id}-name"),
                idempotency_key: format!("{id}-key"),
                parent_id: None,
                status: TaskStatus::Pending,
                noop: false,
                output: None,
                started_at: None,
                completed_at: None,
                delay_until: None,
            },
        }
    }

    pub fn noop(mut self) -> Self {
        self.task.noop = true;
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.task.status = status;
        self
    }

    /// Mark completed with `output`
    pub fn completed(mut self, output: Option<Value>) -> Self {
        self.task.status = TaskStatus::Completed;
        self.task.completed_at = Some(Utc::now());
        self.task.output = output;
        self
    }

    pub fn build(self) -> Task {
        self.task
    }
}

pub fn event_log() -> EventLog {
    EventLog {
        id: EVENT_ID.to_string(),
        name: "user.created".to_string(),
        payload: json!({"userId": "u_42"}),
        context: Some(json!({"source": "signup"})),
        timestamp: execution_started_at(),
        deliver_at: None,
        delivered_at: Some(execution_started_at()),
    }
}

/// Store, queue and client wired the way the worker binary wires them
pub struct Fixture {
    pub store: Arc<InMemoryTaskStore>,
    pub queue: Arc<InMemoryJobQueue>,
    pub client: Arc<RecordingClientFactory>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_execution_status(ExecutionStatus::Running)
    }

    pub fn with_execution_status(status: ExecutionStatus) -> Self {
        let store = Arc::new(InMemoryTaskStore::new());

        store.insert_organization(Organization {
            id: "org_1".to_string(),
            slug: ORGANIZATION_SLUG.to_string(),
        });
        store.insert_environment(RuntimeEnvironment {
            id: "env_1".to_string(),
            slug: ENVIRONMENT_SLUG.to_string(),
            api_key: API_KEY.to_string(),
        });
        store.insert_job_instance(JobInstance {
            id: "ji_1".to_string(),
            version: JOB_VERSION.to_string(),
            job: Job {
                id: "job_1".to_string(),
                slug: JOB_SLUG.to_string(),
            },
            endpoint: Endpoint {
                id: "ep_1".to_string(),
                slug: "production-web".to_string(),
                url: ENDPOINT_URL.to_string(),
            },
        });
        store.insert_event_log(event_log());
        store.insert_execution(Execution {
            id: EXECUTION_ID.to_string(),
            status,
            is_test: false,
            started_at: Some(execution_started_at()),
            completed_at: None,
            output: None,
            job_instance_id: "ji_1".to_string(),
            environment_id: "env_1".to_string(),
            organization_id: "org_1".to_string(),
            event_log_id: EVENT_ID.to_string(),
        });

        Self {
            store,
            queue: Arc::new(InMemoryJobQueue::new()),
            client: Arc::new(RecordingClientFactory::new()),
        }
    }

    pub fn add_task(&self, task: Task) {
        self.store.insert_task(task);
    }

    pub fn execution(&self) -> Execution {
        self.store.execution(EXECUTION_ID).expect("fixture execution")
    }

    pub fn task(&self, id: &str) -> Task {
        self.store.task(id).expect("fixture task")
    }

    pub fn resumer(&self) -> TaskResumer {
        TaskResumer::new(self.store.clone(), self.client.clone(), self.queue.clone())
    }

    pub fn worker(&self, config: WorkerConfig) -> ResumeWorker {
        ResumeWorker::new(self.queue.clone(), Arc::new(self.resumer()), config)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

pub fn fast_worker_config() -> WorkerConfig {
    WorkerConfig {
        poll_interval_ms: 10,
        batch_size: 10,
        max_attempts: 5,
        backoff_base_ms: 1_000,
        backoff_max_ms: 60_000,
    }
}
