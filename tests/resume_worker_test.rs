mod common;

use chrono::Utc;
use serde_json::json;
use std::time::Duration;
use tokio::sync::watch;

use common::*;
use execution_resumer::client::{ExecuteJobResponse, ExecutionClientError};
use execution_resumer::messaging::{EnqueueRequest, ResumptionScheduler};
use execution_resumer::orchestration::PollSummary;
use execution_resumer::{ExecutionStatus, TaskStatus};

#[tokio::test]
async fn test_successful_item_is_completed() {
    let fixture = Fixture::new();
    fixture.add_task(TaskBuilder::new("T1").build());
    fixture.client.respond_with(Ok(ExecuteJobResponse {
        completed: true,
        output: None,
        task: None,
    }));
    fixture
        .queue
        .enqueue(EnqueueRequest::resume_task("T1", None).unwrap())
        .await
        .unwrap();

    let summary = fixture.worker(fast_worker_config()).run_once().await.unwrap();

    assert_eq!(
        summary,
        PollSummary {
            claimed: 1,
            completed: 1,
            retried: 0,
            failed: 0,
        }
    );
    assert!(fixture.queue.pending().is_empty());
    assert_eq!(fixture.execution().status, ExecutionStatus::Success);
}

#[tokio::test]
async fn test_resumption_chain_enqueues_next_item() {
    let fixture = Fixture::new();
    fixture.add_task(TaskBuilder::new("T1").noop().build());
    fixture.add_task(TaskBuilder::new("T2").build());
    fixture
        .client
        .respond_with(Ok(ExecuteJobResponse {
            completed: false,
            output: None,
            task: Some(execution_resumer::client::NextTask {
                id: "T2".to_string(),
                delay_until: None,
            }),
        }));
    fixture
        .queue
        .enqueue(EnqueueRequest::resume_task("T1", None).unwrap())
        .await
        .unwrap();

    let worker = fixture.worker(fast_worker_config());
    let first = worker.run_once().await.unwrap();
    assert_eq!(first.completed, 1);

    let pending = fixture.queue.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].payload, json!({"id": "T2"}));

    let second = worker.run_once().await.unwrap();
    assert_eq!(second.completed, 1);
    assert_eq!(fixture.task("T2").status, TaskStatus::Running);
}

#[tokio::test]
async fn test_transient_failure_is_redelivered_with_backoff() {
    let fixture = Fixture::new();
    fixture.add_task(TaskBuilder::new("T1").build());
    fixture
        .client
        .respond_with(Err(ExecutionClientError::Transport(
            "connection refused".to_string(),
        )));
    let job_id = fixture
        .queue
        .enqueue(EnqueueRequest::resume_task("T1", None).unwrap())
        .await
        .unwrap();

    let before = Utc::now();
    let summary = fixture.worker(fast_worker_config()).run_once().await.unwrap();

    assert_eq!(summary.retried, 1);
    let pending = fixture.queue.pending();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].attempts, 1);
    assert!(pending[0].run_at >= before + chrono::Duration::milliseconds(1_000));
    assert!(fixture
        .queue
        .last_error(job_id)
        .unwrap()
        .contains("connection refused"));

    // Not due yet
    let again = fixture.worker(fast_worker_config()).run_once().await.unwrap();
    assert_eq!(again.claimed, 0);
    assert_eq!(fixture.execution().status, ExecutionStatus::Running);
}

#[tokio::test]
async fn test_unknown_identifier_fails_permanently() {
    let fixture = Fixture::new();
    let job_id = fixture
        .queue
        .enqueue(EnqueueRequest::new("sendEmail", json!({"to": "a@b.c"})))
        .await
        .unwrap();

    let summary = fixture.worker(fast_worker_config()).run_once().await.unwrap();

    assert_eq!(summary.failed, 1);
    let pending = fixture.queue.pending();
    assert_eq!(pending[0].attempts, pending[0].max_attempts);
    assert!(fixture
        .queue
        .last_error(job_id)
        .unwrap()
        .contains("Unknown task identifier"));
    assert_eq!(fixture.client.call_count(), 0);
}

#[tokio::test]
async fn test_missing_task_fails_permanently() {
    let fixture = Fixture::new();
    fixture
        .queue
        .enqueue(EnqueueRequest::resume_task("ghost", None).unwrap())
        .await
        .unwrap();

    let summary = fixture.worker(fast_worker_config()).run_once().await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.retried, 0);
}

#[tokio::test]
async fn test_exhausted_attempts_fail_permanently() {
    let fixture = Fixture::new();
    fixture.add_task(TaskBuilder::new("T1").build());
    fixture
        .client
        .respond_with(Err(ExecutionClientError::Timeout("deadline".to_string())));
    fixture
        .queue
        .enqueue(
            EnqueueRequest::resume_task("T1", None)
                .unwrap()
                .with_max_attempts(1),
        )
        .await
        .unwrap();

    let summary = fixture.worker(fast_worker_config()).run_once().await.unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.retried, 0);
}

#[tokio::test]
async fn test_run_stops_on_shutdown() {
    let fixture = Fixture::new();
    let worker = fixture.worker(fast_worker_config());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let handle = tokio::spawn(async move { worker.run(shutdown_rx).await });
    tokio::time::sleep(Duration::from_millis(30)).await;
    shutdown_tx.send(true).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("worker did not stop")
        .unwrap();
    assert!(result.is_ok());
}
