#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, SQLx in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Execution Resumer
//!
//! Resumes suspended job executions.
//!
//! ## Overview
//!
//! A job execution runs on a remote job endpoint and suspends whenever it
//! waits on a task (a delay, an external callback, a sub-step). When that task
//! is resumed, this crate records the task's new status, replays the execution
//! on its endpoint with every task that already completed, and acts on the
//! answer: the execution succeeds, suspends on a next task that is queued for
//! later, or fails with the endpoint's error.
//!
//! ## Module Organization
//!
//! - [`orchestration`] - [`TaskResumer`] and the queue-draining [`ResumeWorker`]
//! - [`client`] - Execution client traits and the reqwest implementation
//! - [`database`] - Task store trait with PostgreSQL and in-memory backends
//! - [`messaging`] - Deferred work queue
//! - [`models`] - Tasks, executions and their read-only context
//! - [`state_machine`] - Task and execution statuses and legal transitions
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Tracing setup and structured log macros
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use execution_resumer::client::HttpExecutionClientFactory;
//! use execution_resumer::config::ConfigLoader;
//! use execution_resumer::database::{create_pool, PgTaskStore};
//! use execution_resumer::messaging::PgJobQueue;
//! use execution_resumer::TaskResumer;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().load()?;
//! let pool = create_pool(&config.database).await?;
//!
//! let resumer = TaskResumer::new(
//!     Arc::new(PgTaskStore::new(pool.clone())),
//!     Arc::new(HttpExecutionClientFactory::new(&config.client)?),
//!     Arc::new(PgJobQueue::new(pool)),
//! );
//! resumer.resume("task_123", None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests (in-memory backends)
//! ```

pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod orchestration;
pub mod state_machine;
pub mod validation;

pub use config::{ConfigLoader, ResumerConfig};
pub use error::{ResumeError, ResumeResult};
pub use orchestration::{ResumeOutcome, ResumeWorker, TaskResumer};
pub use state_machine::{ExecutionStatus, TaskStatus};
