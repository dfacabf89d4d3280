use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::{info, warn};

pub const CONFIG_ENV: &str = "ALERTMESH_RELAY_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "relay.yaml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RelayConfig {
    pub bind: String,
    pub port: u16,
    pub nickname: String,
    pub room: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 3001,
            nickname: "You".into(),
            room: "chat-room".into(),
        }
    }
}

pub async fn load_config() -> RelayConfig {
    let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.into());
    load_config_from(&path).await
}

/// Fichier absent, vide ou invalide : config par défaut.
pub async fn load_config_from(path: impl AsRef<Path>) -> RelayConfig {
    let path = path.as_ref();
    if !path.exists() {
        info!("[relay] pas de {}, usage config par défaut", path.display());
        return RelayConfig::default();
    }
    let txt = fs::read_to_string(path).await.unwrap_or_default();
    if txt.trim().is_empty() {
        return RelayConfig::default();
    }
    serde_yaml::from_str(&txt).unwrap_or_else(|e| {
        warn!("[relay] config invalide {}: {e}", path.display());
        RelayConfig::default()
    })
}
