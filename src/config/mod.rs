//! Configuration management for Dojokit

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::EntityKind;
use crate::error::{ConfigError, Result};
use crate::ratelimit::QuotaTable;

/// Platform API base URL
pub const DEFAULT_API_HOST: &str = "https://app.dojokit.dev";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Platform API key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default organization ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,

    /// Custom API host (development/self-hosted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,

    /// Entity cache tuning
    #[serde(default)]
    pub cache: CacheSettings,

    /// Rate limiting quotas
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Maximum rows printed by list commands
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,
}

fn default_page_limit() -> usize {
    500
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            format: None,
            page_limit: default_page_limit(),
        }
    }
}

/// Entity cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// TTL for entities without an override; unset keeps each entity's
    /// built-in TTL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_ttl_secs: Option<u64>,

    /// Upstream fetch timeout; a timeout is treated as a failed fetch
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Per-entity TTL overrides in seconds
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub ttl_overrides: HashMap<EntityKind, u64>,
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            default_ttl_secs: None,
            fetch_timeout_secs: default_fetch_timeout_secs(),
            ttl_overrides: HashMap::new(),
        }
    }
}

impl CacheSettings {
    /// TTL for an entity: override, else the configured default, else the
    /// built-in per-entity TTL.
    pub fn ttl_for(&self, kind: EntityKind) -> Duration {
        self.ttl_overrides
            .get(&kind)
            .or(self.default_ttl_secs.as_ref())
            .map(|secs| Duration::from_secs(*secs))
            .unwrap_or_else(|| kind.default_ttl())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }
}

/// Which counter store backs the rate-limit guard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitBackend {
    /// Single-process sliding-window counters
    #[default]
    Memory,
    /// No limiting; every request is allowed
    Disabled,
}

/// Rate limiting settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateLimitSettings {
    #[serde(default)]
    pub backend: RateLimitBackend,

    #[serde(default)]
    pub quotas: QuotaTable,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".dojokit").join("config.yaml"))
    }

    /// Resolve the config path from an optional override
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an optional override path
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to an optional override path
    pub fn save_at(&self, path: Option<&str>) -> Result<()> {
        self.save_to(Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // API key lives here; keep it private to the user
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Validate that required configuration is present
    pub fn validate_auth(&self) -> Result<()> {
        if self.api_key.is_none() {
            return Err(ConfigError::MissingApiKey.into());
        }
        Ok(())
    }

    /// API host: runtime override, then config, then the public platform.
    pub fn api_host_or_default(&self, override_host: Option<&str>) -> String {
        override_host
            .map(str::to_string)
            .or_else(|| self.api_host.clone())
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string())
            .trim_end_matches('/')
            .to_string()
    }
}
