//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `wothub.toml` in the working directory. Every field has a
//! default so the file is optional. Environment variables win over file
//! values.

use std::time::Duration;

use chrono::TimeDelta;
use serde::Deserialize;
use wothub_domain::event::EventRetention;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    /// Exposed things.
    pub things: ThingsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    pub port: u16,
    /// Notifications buffered per stream client before it gets dropped.
    pub stream_buffer: usize,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Settings of the virtual things collection.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ThingsConfig {
    /// Title of the collection served at `/`.
    pub title: String,
    /// Delay between two humidity readings, in milliseconds.
    pub sensor_interval_ms: u64,
    pub event_retention: RetentionConfig,
}

/// Bounds of each thing's event log. Both unset keeps every event.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub max_events: Option<usize>,
    pub max_age_secs: Option<u32>,
}

impl Config {
    /// Load configuration from `wothub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or when a
    /// value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("wothub.toml")?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("WOTHUB_HOST") {
            self.server.host = val;
        }
        if let Some(port) = var("WOTHUB_PORT").and_then(|val| val.parse().ok()) {
            self.server.port = port;
        }
        let bind = var("WOTHUB_BIND");
        if let Some((host, port)) = bind.as_deref().and_then(|val| val.rsplit_once(':')) {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("WOTHUB_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(ms) = var("WOTHUB_SENSOR_INTERVAL_MS").and_then(|val| val.parse().ok()) {
            self.things.sensor_interval_ms = ms;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.server.stream_buffer == 0 {
            return Err(ConfigError::Validation(
                "stream_buffer must be non-zero".to_string(),
            ));
        }
        if self.things.sensor_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "sensor_interval_ms must be non-zero".to_string(),
            ));
        }
        if self.things.title.trim().is_empty() {
            return Err(ConfigError::Validation("title must not be empty".to_string()));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn sensor_interval(&self) -> Duration {
        Duration::from_millis(self.things.sensor_interval_ms)
    }

    #[must_use]
    pub fn event_retention(&self) -> EventRetention {
        let retention = &self.things.event_retention;
        EventRetention {
            max_events: retention.max_events,
            max_age: retention
                .max_age_secs
                .map(|secs| TimeDelta::seconds(i64::from(secs))),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8888,
            stream_buffer: 64,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "wothubd=info,wothub=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for ThingsConfig {
    fn default() -> Self {
        Self {
            title: "LightAndTempDevice".to_string(),
            sensor_interval_ms: 3000,
            event_retention: RetentionConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
