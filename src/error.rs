//! Error types for the execution resumer.
//!

use thiserror::Error;

use crate::client::ExecutionClientError;
use crate::config::ConfigurationError;

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Execution client error: {0}")]
    Client(#[from] ExecutionClientError),
    #[error("Scheduler error: {0}")]
    Scheduler(String),
    #[error("State transition error: {0}")]
    StateTransition(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ResumeError {
    pub fn task_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Task",
            id: id.into(),
        }
    }

    pub fn execution_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "Execution",
            id: id.into(),
        }
    }

    /// Errors the caller should not redeliver: the same input fails the same way.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Validation(_) | Self::Configuration(_)
        )
    }
}

impl From<sqlx::Error> for ResumeError {
    fn from(err: sqlx::Error) -> Self {
        ResumeError::Database(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for ResumeError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        ResumeError::Database(format!("Migration failed: {err}"))
    }
}

impl From<serde_json::Error> for ResumeError {
    fn from(err: serde_json::Error) -> Self {
        ResumeError::Serialization(err.to_string())
    }
}

impl From<ConfigurationError> for ResumeError {
    fn from(err: ConfigurationError) -> Self {
        ResumeError::Configuration(err.to_string())
    }
}

pub type ResumeResult<T> = std::result::Result<T, ResumeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ResumeError::task_not_found("missing-id");
        assert_eq!(err.to_string(), "Task not found: missing-id");
        assert!(err.is_permanent());
    }

    #[test]
    fn test_database_errors_are_retryable() {
        let err: ResumeError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, ResumeError::Database(_)));
        assert!(!err.is_permanent());
    }

    #[test]
    fn test_unrecognized_client_errors_are_retryable() {
        let err = ResumeError::from(ExecutionClientError::Transport("connection reset".into()));
        assert!(!err.is_permanent());
        assert!(err.to_string().contains("connection reset"));
    }
}
