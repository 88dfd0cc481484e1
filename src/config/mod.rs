//! # Resumer Configuration
//!
//! Layered configuration: built-in defaults, then optional TOML files, then
//! environment variables.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use execution_resumer::config::ConfigLoader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new().load()?;
//!
//! let database_url = &config.database.url;
//! let batch_size = config.worker.batch_size;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigLoader;

/// Root configuration structure mirroring `config/resumer.toml`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResumerConfig {
    /// Database connection and pooling configuration
    pub database: DatabaseConfig,

    /// Job endpoint HTTP client settings
    pub client: ClientConfig,

    /// Queue polling and redelivery settings
    pub worker: WorkerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/execution_resumer_development".to_string(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Request timeout for a single job execution call
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            user_agent: format!("execution-resumer/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub poll_interval_ms: u64,
    pub batch_size: usize,
    /// Deliveries per queue item before it is left failed
    pub max_attempts: i32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            batch_size: 10,
            max_attempts: 25,
            backoff_base_ms: 1_000,
            backoff_max_ms: 600_000,
        }
    }
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Redelivery delay after `attempts` failed deliveries: exponential from
    /// `backoff_base_ms`, capped at `backoff_max_ms`.
    pub fn backoff_for(&self, attempts: i32) -> Duration {
        let exponent = attempts.saturating_sub(1).clamp(0, 30) as u32;
        let delay_ms = self
            .backoff_base_ms
            .saturating_mul(1u64 << exponent)
            .min(self.backoff_max_ms);
        Duration::from_millis(delay_ms)
    }
}

impl ResumerConfig {
    /// Reject configurations that would stall or misbehave at runtime
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigurationError::invalid_value(
                "database.url",
                "",
                "database URL is required",
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.max_connections",
                self.database.max_connections,
                "must be greater than 0",
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigurationError::invalid_value(
                "database.min_connections",
                self.database.min_connections,
                format!(
                    "must not exceed max_connections ({})",
                    self.database.max_connections
                ),
            ));
        }
        if self.client.timeout_ms == 0 {
            return Err(ConfigurationError::invalid_value(
                "client.timeout_ms",
                self.client.timeout_ms,
                "must be greater than 0",
            ));
        }
        if self.worker.batch_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "worker.batch_size",
                self.worker.batch_size,
                "must be greater than 0",
            ));
        }
        if self.worker.max_attempts < 1 {
            return Err(ConfigurationError::invalid_value(
                "worker.max_attempts",
                self.worker.max_attempts,
                "must be at least 1",
            ));
        }
        if self.worker.backoff_base_ms > self.worker.backoff_max_ms {
            return Err(ConfigurationError::invalid_value(
                "worker.backoff_base_ms",
                self.worker.backoff_base_ms,
                format!(
                    "must not exceed backoff_max_ms ({})",
                    self.worker.backoff_max_ms
                ),
            ));
        }
        Ok(())
    }
}
