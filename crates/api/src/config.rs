use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Largest accepted request body, uploads included.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Allowed CORS origins; empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory for ingested tender documents.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Directory for rendered proposal artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// Matching engine to use. Only `demo` is available.
    #[serde(default = "default_matching_engine")]
    pub engine: String,

    /// Free-text catalog description, logged at start-up.
    #[serde(default)]
    pub catalog_hint: Option<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            engine: default_matching_engine(),
            catalog_hint: None,
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_request_timeout() -> u64 {
    60
}
fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}
fn default_max_connections() -> u32 {
    5
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_upload_dir() -> PathBuf {
    PathBuf::from("data/uploads")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("data/output")
}
fn default_matching_engine() -> String {
    "demo".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with TH__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("TH").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Defaults are embedded so tests do not depend on the working directory.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8000
            request_timeout_secs = 60
            max_upload_bytes = 20971520

            [database]
            url = ""
            max_connections = 5
            min_connections = 1
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []

            [storage]
            upload_dir = "data/uploads"
            output_dir = "data/output"

            [matching]
            engine = "demo"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        // Validation is left to the individual tests
        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "TH__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.storage.upload_dir.as_os_str().is_empty()
            || self.storage.output_dir.as_os_str().is_empty()
        {
            return Err(ConfigValidationError::MissingRequired(
                "storage.upload_dir and storage.output_dir must be set".to_string(),
            ));
        }

        if self.matching.engine != "demo" {
            return Err(ConfigValidationError::InvalidValue(format!(
                "Unknown matching engine: {}",
                self.matching.engine
            )));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_DB: &str = "sqlite://data/test.db";

    #[test]
    fn test_config_load_with_defaults() {
        let config =
            Config::load_for_test(&[("database.url", TEST_DB)]).expect("Failed to load config");

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.max_upload_bytes, 20 * 1024 * 1024);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.storage.upload_dir, PathBuf::from("data/uploads"));
        assert_eq!(config.matching.engine, "demo");
        assert!(config.matching.catalog_hint.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_env_override() {
        let config = Config::load_for_test(&[
            ("database.url", TEST_DB),
            ("server.port", "9000"),
            ("logging.level", "debug"),
            ("storage.output_dir", "/var/lib/tender-hub/output"),
        ])
        .expect("Failed to load config");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.storage.output_dir,
            PathBuf::from("/var/lib/tender-hub/output")
        );
    }

    #[test]
    fn test_config_validation_missing_db_url() {
        let config = Config::load_for_test(&[]).expect("Failed to load config");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("TH__DATABASE__URL"));
    }

    #[test]
    fn test_config_validation_invalid_pool_settings() {
        let config = Config::load_for_test(&[
            ("database.url", TEST_DB),
            ("database.min_connections", "10"),
            ("database.max_connections", "2"),
        ])
        .expect("Failed to load config");

        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("min_connections"));
    }

    #[test]
    fn test_config_validation_empty_storage_dir() {
        let config = Config::load_for_test(&[("database.url", TEST_DB), ("storage.upload_dir", "")])
            .expect("Failed to load config");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_unknown_engine() {
        let config = Config::load_for_test(&[("database.url", TEST_DB), ("matching.engine", "ocr")])
            .expect("Failed to load config");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ocr"));
    }

    #[test]
    fn test_socket_addr() {
        let config = Config::load_for_test(&[
            ("database.url", TEST_DB),
            ("server.host", "127.0.0.1"),
            ("server.port", "3000"),
        ])
        .expect("Failed to load config");

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_database_config_conversion() {
        let config =
            Config::load_for_test(&[("database.url", TEST_DB)]).expect("Failed to load config");
        let db: persistence::db::DatabaseConfig = (&config.database).into();
        assert_eq!(db.url, TEST_DB);
        assert_eq!(db.max_connections, 5);
    }
}
