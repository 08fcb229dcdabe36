//! Configuration loading.
//!
//! Configuration is layered with figment (later sources override earlier):
//! 1. Built-in defaults
//! 2. TOML file (`homepage.toml` in the working directory, or `--config`)
//! 3. Environment variables prefixed with `HOMEPAGE_`, nested with `__`
//!    (e.g. `HOMEPAGE_MAIL__OWNER=me@example.com`)

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tasks::RetryConfig;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "homepage.toml";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "HOMEPAGE_";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider failed or a value had the wrong shape.
    #[error("failed to load configuration: {0}")]
    Load(Box<figment::Error>),

    /// A value was well-formed but unusable.
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Load(Box::new(e))
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub mail: MailConfig,
    pub queue: QueueConfig,
    pub contact: ContactConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub bind: String,
}

/// Fixed metadata every page is rendered with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub meta_description: String,
    pub meta_keywords: String,
}

/// Outbound mail settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Site owner's address. Contact notifications are sent from and to it.
    pub owner: String,
    /// HTTP endpoint of a transactional mail API. When unset, mail is logged
    /// instead of sent.
    pub endpoint: Option<String>,
    /// Bearer token for the mail API.
    pub api_token: Option<String>,
}

/// Settings for the contact notification queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Queue name; doubles as the throttle group for outbound mail.
    pub name: String,
    /// Minimum spacing between two deliveries from this queue.
    pub throttle_ms: u64,
    /// Redelivery attempts after the first failure before a task is dropped.
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub validation: ContactValidation,
}

/// How contact form submissions are checked before being queued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactValidation {
    /// Every submission is queued, including blank fields.
    #[default]
    AcceptAll,
    /// Submissions with a blank name, email or message are rejected with an
    /// error message instead of being queued.
    RequireAll,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Jesse Shieh".to_string(),
            meta_description: "Looking for Jesse Shieh? Try jesseshieh.com".to_string(),
            meta_keywords: "Jesse Shieh, Resume, Software Engineer, Engineering Manager"
                .to_string(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            owner: "jesse.shieh@gmail.com".to_string(),
            endpoint: None,
            api_token: None,
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: "email-throttle".to_string(),
            throttle_ms: 1_000,
            max_retries: 5,
            initial_backoff_ms: 2_000,
            max_backoff_ms: 60_000,
        }
    }
}

impl QueueConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Backoff schedule for redeliveries.
    pub fn retry(&self) -> RetryConfig {
        RetryConfig::new(
            self.max_retries,
            Duration::from_millis(self.initial_backoff_ms),
            Duration::from_millis(self.max_backoff_ms),
            2.0,
        )
    }
}

impl Config {
    /// Loads configuration from the default file in the working directory,
    /// if present, and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads configuration with an optional explicit file path.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Checks values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;

        if self.queue.name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "queue.name must not be empty".to_string(),
            });
        }

        if self.mail.owner.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "mail.owner must not be empty".to_string(),
            });
        }

        if self.queue.initial_backoff_ms > self.queue.max_backoff_ms {
            return Err(ConfigError::Invalid {
                message: format!(
                    "queue.initial_backoff_ms ({}) cannot be greater than queue.max_backoff_ms ({})",
                    self.queue.initial_backoff_ms, self.queue.max_backoff_ms
                ),
            });
        }

        Ok(())
    }

    /// Parses the configured bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server
            .bind
            .parse()
            .map_err(|e| ConfigError::Invalid {
                message: format!("server.bind {:?} is not a socket address: {e}", self.server.bind),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.queue.name, "email-throttle");
        assert_eq!(config.contact.validation, ContactValidation::AcceptAll);
        assert!(config.mail.endpoint.is_none());
    }

    #[test]
    fn default_bind_addr_parses() {
        let addr = Config::default().bind_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let mut config = Config::default();
        config.server.bind = "not an address".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("server.bind"));
    }

    #[test]
    fn empty_queue_name_is_rejected() {
        let mut config = Config::default();
        config.queue.name = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("queue.name"));
    }

    #[test]
    fn empty_owner_is_rejected() {
        let mut config = Config::default();
        config.mail.owner = String::new();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("mail.owner"));
    }

    #[test]
    fn inverted_backoff_is_rejected() {
        let mut config = Config::default();
        config.queue.initial_backoff_ms = 10_000;
        config.queue.max_backoff_ms = 1_000;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("initial_backoff_ms"));
    }

    #[test]
    fn toml_file_overrides_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[site]
title = "Ada Lovelace"

[queue]
throttle_ms = 250

[contact]
validation = "require_all"
"#
        )
        .unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.site.title, "Ada Lovelace");
        assert_eq!(config.queue.throttle(), Duration::from_millis(250));
        assert_eq!(config.contact.validation, ContactValidation::RequireAll);
        // Untouched sections keep their defaults.
        assert_eq!(config.queue.name, "email-throttle");
        assert_eq!(config.site.meta_keywords, SiteConfig::default().meta_keywords);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.site, SiteConfig::default());
    }

    #[test]
    fn malformed_file_is_a_load_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[queue]\nthrottle_ms = \"soon\"").unwrap();

        let result = Config::load_from(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Load(_))));
    }

    #[test]
    fn retry_schedule_follows_queue_settings() {
        let queue = QueueConfig::default();
        let retry = queue.retry();
        assert_eq!(retry.max_retries, 5);
        assert_eq!(retry.initial_delay, Duration::from_secs(2));
        assert_eq!(retry.max_delay, Duration::from_secs(60));
    }
}
