//! Configuration management for the backend.
//!
//! Settings are read from a [`ConfigSource`] (environment variables in
//! production, an in-memory map in tests) into [`AppConfig`]. The composition
//! root then hands the relevant values to the container as plain value
//! registrations.

use std::collections::HashMap;
use std::env;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Value present but malformed
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: String,
        value: String,
        reason: &'static str,
    },
}

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    /// Get a raw configuration value by key (lowercase, e.g. `port`)
    fn get(&self, key: &str) -> Option<String>;
}

/// Environment variable configuration source
///
/// Key `port` with prefix `QUARRY` reads `QUARRY_PORT`.
#[derive(Debug, Default)]
pub struct EnvironmentConfigSource {
    /// Prefix to filter environment variables
    prefix: Option<String>,
}

impl EnvironmentConfigSource {
    pub fn new() -> Self {
        Self { prefix: None }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn env_key(&self, key: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix.to_uppercase(), key.to_uppercase()),
            None => key.to_uppercase(),
        }
    }
}

impl ConfigSource for EnvironmentConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        env::var(self.env_key(key)).ok()
    }
}

/// In-memory configuration source
#[derive(Debug, Default, Clone)]
pub struct MapConfigSource {
    values: HashMap<String, String>,
}

impl MapConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }
}

impl ConfigSource for MapConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `quarry=debug`
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Application settings
///
/// | key                 | default           |
/// |---------------------|-------------------|
/// | `connection_string` | `memory://quarry` |
/// | `host`              | `127.0.0.1`       |
/// | `port`              | `8091`            |
/// | `base_path`         | `/api/v1`         |
/// | `api_tokens`        | empty             |
/// | `log_level`         | `info`            |
/// | `log_json`          | `false`           |
/// | `seed`              | `0` (no seeding)  |
///
/// `api_tokens` is a comma separated list of `token=user_id` pairs accepted as
/// bearer tokens.
///
/// # Examples
///
/// ```
/// use quarry::config::{AppConfig, MapConfigSource};
///
/// let source = MapConfigSource::new()
///     .with("port", "9000")
///     .with("api_tokens", "secret=64b7f0c2a1e4d3b2c1a09f8e");
/// let config = AppConfig::load(&source).unwrap();
///
/// assert_eq!(config.port, 9000);
/// assert_eq!(config.base_path, "/api/v1");
/// assert_eq!(config.api_tokens[0].0, "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub connection_string: String,
    pub host: String,
    pub port: u16,
    pub base_path: String,
    pub api_tokens: Vec<(String, String)>,
    pub logging: LoggingConfig,
    /// Number of demo games generated at startup; `0` disables seeding.
    pub seed_games: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            connection_string: "memory://quarry".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8091,
            base_path: "/api/v1".to_string(),
            api_tokens: Vec::new(),
            logging: LoggingConfig::default(),
            seed_games: 0,
        }
    }
}

impl AppConfig {
    /// Environment prefix used by [`AppConfig::from_env`].
    pub const ENV_PREFIX: &'static str = "QUARRY";

    /// Loads settings from `QUARRY_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(&EnvironmentConfigSource::with_prefix(Self::ENV_PREFIX))
    }

    /// Loads settings from `source`, falling back to defaults.
    pub fn load(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(value) = source.get("connection_string") {
            config.connection_string = value;
        }
        if let Some(value) = source.get("host") {
            config.host = value;
        }
        if let Some(value) = source.get("port") {
            config.port = value.parse().map_err(|_| ConfigError::Invalid {
                key: "port".to_string(),
                value: value.clone(),
                reason: "expected a port number",
            })?;
        }
        if let Some(value) = source.get("base_path") {
            config.base_path = normalize_base_path(&value);
        }
        if let Some(value) = source.get("api_tokens") {
            config.api_tokens = parse_tokens(&value)?;
        }
        if let Some(value) = source.get("log_level") {
            config.logging.level = value;
        }
        if let Some(value) = source.get("log_json") {
            config.logging.json_format = value.parse().map_err(|_| ConfigError::Invalid {
                key: "log_json".to_string(),
                value: value.clone(),
                reason: "expected true or false",
            })?;
        }

        if let Some(value) = source.get("seed") {
            config.seed_games = value.parse().map_err(|_| ConfigError::Invalid {
                key: "seed".to_string(),
                value: value.clone(),
                reason: "expected a number of games",
            })?;
        }

        Ok(config)
    }

    /// `host:port` for binding the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn normalize_base_path(value: &str) -> String {
    let trimmed = value.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

fn parse_tokens(value: &str) -> Result<Vec<(String, String)>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((token, user)) if !token.is_empty() && !user.is_empty() => {
                Ok((token.to_string(), user.to_string()))
            }
            _ => Err(ConfigError::Invalid {
                key: "api_tokens".to_string(),
                value: pair.to_string(),
                reason: "expected token=user_id",
            }),
        })
        .collect()
}
