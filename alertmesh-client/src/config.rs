//! Client configuration
//!
//! Handles:
//! - Server base URL (injected, never hardcoded in the transport)
//! - Polling interval and optional backoff
//! - Message identity mode
//! - Nickname and room shown by the renderers

use crate::error::ConfigError;
use crate::normalizer::IdentityMode;
use crate::poller::{Backoff, PollSchedule};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "ALERTMESH_CONFIG";
pub const SERVER_URL_ENV: &str = "ALERTMESH_SERVER_URL";
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    #[serde(alias = "serverBaseUrl")]
    pub server_base_url: String,
    pub nickname: String,
    pub room_name: String,
    pub identity: IdentityMode,
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backoff: Option<BackoffConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackoffConfig {
    pub multiplier: f64,
    pub max_interval_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_base_url: DEFAULT_SERVER_URL.to_string(),
            nickname: "You".to_string(),
            room_name: "emergency-chat".to_string(),
            identity: IdentityMode::Ephemeral,
            polling: PollingConfig::default(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            request_timeout_ms: None,
            backoff: None,
        }
    }
}

impl ClientConfig {
    /// Load from `$ALERTMESH_CONFIG` or the per-user config file, falling back
    /// to defaults when no file exists. `$ALERTMESH_SERVER_URL` wins over
    /// the file.
    pub async fn load() -> Result<Self, ConfigError> {
        let path = Self::config_file_path()?;
        let mut config = Self::load_from(&path).await?;
        if let Ok(url) = std::env::var(SERVER_URL_ENV) {
            if !url.trim().is_empty() {
                config.server_base_url = url;
            }
        }
        config.validate()?;
        Ok(config)
    }

    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        toml::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub async fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Io { path: parent.to_path_buf(), source })?;
        }
        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(path, content)
            .await
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })
    }

    pub async fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_file_path()?;
        self.save_to(&path).await?;
        Ok(path)
    }

    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push("alertmesh");
        path.push("client.toml");
        Ok(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.server_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                field: "server_base_url",
                reason: format!("expected an http(s) URL, got {url:?}"),
            });
        }
        if self.polling.interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "polling.interval_ms",
                reason: "must be greater than zero".into(),
            });
        }
        if let Some(backoff) = &self.polling.backoff {
            if backoff.multiplier < 1.0 {
                return Err(ConfigError::Invalid {
                    field: "polling.backoff.multiplier",
                    reason: format!("must be at least 1.0, got {}", backoff.multiplier),
                });
            }
        }
        Ok(())
    }

    pub fn schedule(&self) -> PollSchedule {
        let interval = Duration::from_millis(self.polling.interval_ms);
        PollSchedule {
            interval,
            backoff: self.polling.backoff.as_ref().map(|b| Backoff {
                multiplier: b.multiplier,
                max_interval: Duration::from_millis(b.max_interval_ms).max(interval),
            }),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.polling.request_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_client() {
        let config = ClientConfig::default();
        assert_eq!(config.server_base_url, "http://localhost:3001");
        assert_eq!(config.polling.interval_ms, 2000);
        assert!(config.polling.backoff.is_none());
        assert_eq!(config.identity, IdentityMode::Ephemeral);

        let schedule = config.schedule();
        assert_eq!(schedule.interval, Duration::from_secs(2));
        assert!(schedule.backoff.is_none());
    }

    #[test]
    fn accepts_camel_case_base_url() {
        let config: ClientConfig =
            toml::from_str(r#"serverBaseUrl = "http://10.0.0.5:3001""#).unwrap();
        assert_eq!(config.server_base_url, "http://10.0.0.5:3001");
        assert_eq!(config.nickname, "You");
    }

    #[test]
    fn parses_backoff_and_identity() {
        let config: ClientConfig = toml::from_str(
            r#"
            identity = "stable"

            [polling]
            interval_ms = 1000

            [polling.backoff]
            multiplier = 2.0
            max_interval_ms = 500
            "#,
        )
        .unwrap();
        assert_eq!(config.identity, IdentityMode::Stable);
        let backoff = config.schedule().backoff.unwrap();
        // never shorter than the base interval
        assert_eq!(backoff.max_interval, Duration::from_secs(1));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = ClientConfig::default();
        config.server_base_url = "localhost".into();
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.polling.interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ClientConfig::default();
        config.polling.backoff = Some(BackoffConfig { multiplier: 0.5, max_interval_ms: 10 });
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client.toml");

        let mut config = ClientConfig::default();
        config.nickname = "Mira".into();
        config.polling.request_timeout_ms = Some(5000);
        config.save_to(&path).await.unwrap();

        let loaded = ClientConfig::load_from(&path).await.unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.request_timeout(), Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = ClientConfig::load_from(&dir.path().join("absent.toml")).await.unwrap();
        assert_eq!(loaded, ClientConfig::default());
    }
}
