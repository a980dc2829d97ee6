use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "abacus.toml";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(anyhow::anyhow!("unknown log format '{other}'")),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct LimitsConfig {
    #[serde(default = "default_max_body_size_kb")]
    pub max_body_size_kb: usize,
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
    #[serde(default = "default_max_expression_length")]
    pub max_expression_length: usize,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct SecurityConfig {
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
pub struct AbacusConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

impl AbacusConfig {
    /// Load from `ABACUS_CONFIG_PATH`, falling back to `abacus.toml`
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            std::env::var("ABACUS_CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(config_path)
    }

    /// Load from a TOML file; a missing file yields the defaults
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents)
                .with_context(|| format!("Failed to parse configuration file '{}'", path.display())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Configuration file '{}' not found. Using default configuration.",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(err) => Err(err)
                .with_context(|| format!("Failed to read configuration file '{}'", path.display())),
        }
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Apply `ABACUS_*` environment variable overrides
    pub fn apply_profile(mut self) -> Self {
        info!("Applying environment overrides to configuration.");

        if let Ok(host) = std::env::var("ABACUS_HOST") {
            self.server.host = host;
        }
        override_parsed("ABACUS_PORT", &mut self.server.port);
        if let Ok(level) = std::env::var("ABACUS_LOG_LEVEL") {
            self.logging.level = level;
        }
        override_parsed("ABACUS_LOG_FORMAT", &mut self.logging.format);
        override_parsed("ABACUS_RATE_LIMIT", &mut self.security.requests_per_second);
        override_parsed("ABACUS_RATE_BURST", &mut self.security.burst);
        override_parsed("ABACUS_MAX_BATCH_SIZE", &mut self.limits.max_batch_size);
        if let Ok(origins) = std::env::var("ABACUS_ALLOWED_ORIGINS") {
            self.security.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }

        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn override_parsed<T: FromStr>(key: &str, target: &mut T) {
    if let Ok(raw) = std::env::var(key) {
        match raw.parse::<T>() {
            Ok(value) => *target = value,
            Err(_) => warn!(key, value = %raw, "Ignoring unparsable environment override"),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout_seconds() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> LogFormat {
    LogFormat::Json
}
fn default_max_body_size_kb() -> usize {
    1024
}
fn default_max_batch_size() -> usize {
    100
}
fn default_max_expression_length() -> usize {
    4096
}
fn default_requests_per_second() -> u32 {
    100
}
fn default_burst() -> u32 {
    100
}
fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size_kb: default_max_body_size_kb(),
            max_batch_size: default_max_batch_size(),
            max_expression_length: default_max_expression_length(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
            burst: default_burst(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_defaults() {
        let config = AbacusConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.limits.max_batch_size, 100);
        assert_eq!(config.security.allowed_origins, vec!["*"]);
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AbacusConfig::from_toml(
            r#"
[server]
port = 9090

[logging]
format = "pretty"
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.limits, LimitsConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(AbacusConfig::from_toml("[server]\nport = \"not a port\"").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AbacusConfig::default();
        let rendered = config.to_toml().unwrap();
        assert_eq!(AbacusConfig::from_toml(&rendered).unwrap(), config);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AbacusConfig::load_from("definitely/not/here/abacus.toml").unwrap();
        assert_eq!(config, AbacusConfig::default());
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        // SAFETY: the test is serialised with every other test that touches
        // the process environment.
        unsafe {
            std::env::set_var("ABACUS_PORT", "9191");
            std::env::set_var("ABACUS_LOG_FORMAT", "pretty");
            std::env::set_var("ABACUS_RATE_LIMIT", "not-a-number");
            std::env::set_var("ABACUS_ALLOWED_ORIGINS", "http://a.test, http://b.test");
        }

        let config = AbacusConfig::default().apply_profile();
        assert_eq!(config.server.port, 9191);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.security.requests_per_second, 100);
        assert_eq!(config.security.allowed_origins, vec!["http://a.test", "http://b.test"]);

        // SAFETY: restoring environment to original state (see above).
        unsafe {
            std::env::remove_var("ABACUS_PORT");
            std::env::remove_var("ABACUS_LOG_FORMAT");
            std::env::remove_var("ABACUS_RATE_LIMIT");
            std::env::remove_var("ABACUS_ALLOWED_ORIGINS");
        }
    }
}
