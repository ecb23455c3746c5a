//! Configuration for the catalog service.
//!
//! Configured via a TOML file with environment variable interpolation
//! using `${VAR_NAME}` syntax. All sections are optional with defaults,
//! so the service runs with no config file at all.
//!
//! # Example
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [providers.openai]
//! api_key = "${OPENAI_API_KEY}"
//! ```

mod observability;
mod providers;
mod refresh;
mod server;

use std::path::{Path, PathBuf};

pub use observability::*;
pub use providers::*;
pub use refresh::*;
use serde::{Deserialize, Serialize};
pub use server::*;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Durable snapshot cache.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Refresh scheduling and concurrency.
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Upstream HTTP client settings.
    #[serde(default)]
    pub http: HttpClientConfig,

    /// Per-provider credentials and endpoints.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Retry discipline for upstream fetches.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Logging configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded;
    /// missing variables are an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: AppConfig = toml::from_str(&expanded)?;
        Ok(config)
    }
}

/// Persistence section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// SQLite file backing the snapshot cache. Set to the empty string to
    /// run purely in memory.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

impl CatalogConfig {
    /// The database file path, or `None` when persistence is disabled.
    pub fn db_file(&self) -> Option<PathBuf> {
        if self.db_path.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.db_path))
        }
    }
}

fn default_db_path() -> String {
    "data/models.db".to_string()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
}

/// Expand `${VAR_NAME}` references against the process environment.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static regex");
    let mut result = String::with_capacity(input.len());

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        if std::env::var(var_name).is_err() {
            return Err(ConfigError::EnvVarNotFound(var_name.to_string()));
        }
    }

    let expanded = re.replace_all(input, |caps: &regex::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_default()
    });
    result.push_str(&expanded);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.refresh.interval_secs, 3600);
        assert_eq!(config.refresh.concurrency, 5);
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.catalog.db_file(), Some(PathBuf::from("data/models.db")));
    }

    #[test]
    fn env_vars_are_expanded() {
        // SAFETY: test-local variable name, no concurrent reader cares.
        unsafe { std::env::set_var("MODELDEX_TEST_KEY", "sk-test-123") };
        let config = AppConfig::from_toml_str(
            r#"
            [providers.openai]
            api_key = "${MODELDEX_TEST_KEY}"
            "#,
        )
        .unwrap();
        assert_eq!(config.providers.openai.api_key.as_deref(), Some("sk-test-123"));
    }

    #[test]
    fn missing_env_var_is_an_error() {
        let err = AppConfig::from_toml_str(
            r#"
            [providers.openai]
            api_key = "${MODELDEX_DOES_NOT_EXIST}"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarNotFound(_)));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(AppConfig::from_toml_str("[serverr]\nport = 1").is_err());
    }

    #[test]
    fn empty_db_path_disables_persistence() {
        let config = AppConfig::from_toml_str("[catalog]\ndb_path = \"\"").unwrap();
        assert!(config.catalog.db_file().is_none());
    }
}
