//! Configuration Loader
//!
//! Environment-aware configuration loading. Sources, lowest priority first:
//!
//! 1. [`ResumerConfig::default`]
//! 2. `<config_dir>/resumer.toml` (optional)
//! 3. `<config_dir>/resumer.<environment>.toml` (optional)
//! 4. `DATABASE_URL`
//! 5. `RESUMER__*` variables, `__` separating nested keys
//!    (`RESUMER__WORKER__BATCH_SIZE=20`)

use config::{Config, Environment, File, Map};
use std::path::PathBuf;
use tracing::debug;

use super::error::ConfigResult;
use super::ResumerConfig;

const ENV_PREFIX: &str = "RESUMER";
const ENV_SEPARATOR: &str = "__";

pub struct ConfigLoader {
    config_directory: PathBuf,
    environment: Option<String>,
    variables: Option<Map<String, String>>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            config_directory: PathBuf::from("config"),
            environment: None,
            variables: None,
        }
    }

    pub fn with_config_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config_directory = directory.into();
        self
    }

    /// Use an explicit environment name instead of detecting one
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Read variables from `variables` instead of the process environment.
    /// Useful for testing without modifying global environment variables.
    pub fn with_variables(mut self, variables: Map<String, String>) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn load(&self) -> ConfigResult<ResumerConfig> {
        let variables = self
            .variables
            .clone()
            .unwrap_or_else(|| std::env::vars().collect());
        let environment = self
            .environment
            .clone()
            .unwrap_or_else(|| detect_environment(&variables));

        debug!(
            environment = %environment,
            config_directory = %self.config_directory.display(),
            "Loading resumer configuration"
        );

        let mut database_url = Map::new();
        if let Some(url) = variables.get("DATABASE_URL") {
            database_url.insert("DATABASE__URL".to_string(), url.clone());
        }

        let config: ResumerConfig = Config::builder()
            .add_source(Config::try_from(&ResumerConfig::default())?)
            .add_source(File::from(self.config_directory.join("resumer.toml")).required(false))
            .add_source(
                File::from(
                    self.config_directory
                        .join(format!("resumer.{environment}.toml")),
                )
                .required(false),
            )
            .add_source(
                Environment::default()
                    .separator(ENV_SEPARATOR)
                    .source(Some(database_url)),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .source(Some(variables)),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;

        tracing::info!(
            environment = %environment,
            max_connections = config.database.max_connections,
            batch_size = config.worker.batch_size,
            "Configuration loaded successfully"
        );

        Ok(config)
    }
}

/// Get current environment from environment variables
pub fn detect_environment(variables: &Map<String, String>) -> String {
    variables
        .get("RESUMER_ENV")
        .or_else(|| variables.get("APP_ENV"))
        .cloned()
        .unwrap_or_else(|| "development".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_without_files_or_variables() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::new()
            .with_config_directory(dir.path())
            .with_variables(Map::new())
            .load()
            .unwrap();

        assert_eq!(config, ResumerConfig::default());
    }

    #[test]
    fn test_environment_file_overrides_base_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("resumer.toml"),
            "[worker]\nbatch_size = 5\npoll_interval_ms = 250\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("resumer.test.toml"),
            "[worker]\nbatch_size = 2\n",
        )
        .unwrap();

        let config = ConfigLoader::new()
            .with_config_directory(dir.path())
            .with_variables(vars(&[("RESUMER_ENV", "test")]))
            .load()
            .unwrap();

        assert_eq!(config.worker.batch_size, 2);
        assert_eq!(config.worker.poll_interval_ms, 250);
    }

    #[test]
    fn test_prefixed_variables_win_over_database_url() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::new()
            .with_config_directory(dir.path())
            .with_variables(vars(&[
                ("DATABASE_URL", "postgresql://fallback/db"),
                ("RESUMER__DATABASE__URL", "postgresql://explicit/db"),
                ("RESUMER__CLIENT__TIMEOUT_MS", "5000"),
            ]))
            .load()
            .unwrap();

        assert_eq!(config.database.url, "postgresql://explicit/db");
        assert_eq!(config.client.timeout_ms, 5000);
    }

    #[test]
    fn test_database_url_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::new()
            .with_config_directory(dir.path())
            .with_variables(vars(&[("DATABASE_URL", "postgresql://fallback/db")]))
            .load()
            .unwrap();

        assert_eq!(config.database.url, "postgresql://fallback/db");
    }

    #[test]
    fn test_invalid_values_fail_validation() {
        let dir = tempfile::tempdir().unwrap();
        let result = ConfigLoader::new()
            .with_config_directory(dir.path())
            .with_variables(vars(&[("RESUMER__WORKER__MAX_ATTEMPTS", "0")]))
            .load();

        assert!(result.is_err());
    }

    #[test]
    fn test_detect_environment_defaults_to_development() {
        assert_eq!(detect_environment(&Map::new()), "development");
        assert_eq!(
            detect_environment(&vars(&[("APP_ENV", "production")])),
            "production"
        );
    }
}
