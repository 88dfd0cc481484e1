//! # Execution Client Error Types

use thiserror::Error;

pub type ClientResult<T> = Result<T, ExecutionClientError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionClientError {
    /// The job endpoint answered and reported a failure. This is the only
    /// kind the resumer turns into an execution failure record.
    #[error("{message}")]
    Api {
        status: Option<u16>,
        message: String,
        stack: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ExecutionClientError {
    pub fn api(status: Option<u16>, message: impl Into<String>, stack: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            stack: stack.into(),
        }
    }

    /// Whether the failure came from the job endpoint itself rather than
    /// from getting a request to it or a response back.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::Api { .. })
    }
}

impl From<reqwest::Error> for ExecutionClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}
