//! # Tracing Module
//!
//! Environment-aware console logging using the tracing ecosystem.
//! Logs go to stdout; containers and process supervisors collect them.
//!
//! This module provides:
//! - Console logging with environment-based default levels
//! - `RUST_LOG` overrides through `EnvFilter`
//! - TTY-aware ANSI color output, or JSON lines for log shippers
//! - Domain-specific structured logging macros

use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize console logging. Safe to call more than once; only the first
/// call installs a subscriber, and an existing global subscriber is kept.
pub fn init_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(get_log_level(&environment)));

        let use_ansi = IsTerminal::is_terminal(&std::io::stdout());
        let json = get_log_format() == "json";

        let console_layer = if json {
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_filter(filter)
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(use_ansi)
                .with_filter(filter)
                .boxed()
        };

        let subscriber = tracing_subscriber::registry().with(console_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        } else {
            tracing::info!(
                environment = %environment,
                ansi_colors = use_ansi && !json,
                json,
                "Console logging initialized"
            );
        }
    });
}

/// Get current environment from environment variables
pub fn get_environment() -> String {
    std::env::var("RESUMER_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Output format from `RESUMER_LOG_FORMAT`: `json` or the default `text`
pub fn get_log_format() -> String {
    std::env::var("RESUMER_LOG_FORMAT")
        .map(|f| f.to_ascii_lowercase())
        .unwrap_or_else(|_| "text".to_string())
}

/// Get log level based on environment
pub fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Structured log line for task-level operations
#[macro_export]
macro_rules! log_task {
    ($level:ident, $operation:expr, task_id: $task_id:expr, $($key:ident: $value:expr),* $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            task_id = %$task_id,
            $($key = ?$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "TASK_{}", $operation
        );
    };
    ($level:ident, $operation:expr, task_id: $task_id:expr $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            task_id = %$task_id,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "TASK_{}", $operation
        );
    };
}

/// Structured log line for execution-level operations
#[macro_export]
macro_rules! log_execution {
    ($level:ident, $operation:expr, execution_id: $execution_id:expr, $($key:ident: $value:expr),* $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            execution_id = %$execution_id,
            $($key = ?$value,)*
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "EXECUTION_{}", $operation
        );
    };
    ($level:ident, $operation:expr, execution_id: $execution_id:expr $(,)?) => {
        tracing::$level!(
            operation = %$operation,
            execution_id = %$execution_id,
            timestamp = %chrono::Utc::now().to_rfc3339(),
            "EXECUTION_{}", $operation
        );
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels_by_environment() {
        assert_eq!(get_log_level("production"), "info");
        assert_eq!(get_log_level("development"), "debug");
        assert_eq!(get_log_level("test"), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init_tracing();
        init_tracing();
        crate::log_task!(debug, "LOGGING_SMOKE", task_id: "task_1", attempt: 1);
        crate::log_execution!(debug, "LOGGING_SMOKE", execution_id: "exec_1");
    }
}
