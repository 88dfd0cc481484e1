//! # Database Layer
//!
//! Persistence for tasks and executions behind the [`TaskStore`] trait:
//! [`PgTaskStore`] for PostgreSQL via sqlx, [`InMemoryTaskStore`] for tests.

pub mod connection;
pub mod in_memory;
pub mod migrations;
pub mod postgres;
pub mod store;

pub use connection::{create_pool, health_check};
pub use in_memory::InMemoryTaskStore;
pub use migrations::run_migrations;
pub use postgres::PgTaskStore;
pub use store::TaskStore;
