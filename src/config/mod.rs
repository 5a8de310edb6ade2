//! Service configuration.
//!
//! Loaded from an optional JSON file (`~/.toneshift/config.json` unless a
//! path is given), then overridden by environment variables. Every section
//! is `#[serde(default)]`, so partial files are fine.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::DEFAULT_CACHE_TTL_SECS;
use crate::error::{Result, ToneError};
use crate::providers::mistral::{DEFAULT_MISTRAL_MODEL, MISTRAL_API_URL};

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
            cors_origins: Vec::new(),
        }
    }
}

/// Which [`KeyValueStore`](crate::store::KeyValueStore) implementation to run on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    /// In-process store; history and cache are lost on restart.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub url: String,
    /// Expire idle session history after this many seconds. `None` keeps it forever.
    pub history_ttl_secs: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Redis,
            url: "redis://redis:6379".to_string(),
            history_ttl_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
        }
    }
}

/// Upstream chat-completions endpoint.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_url: MISTRAL_API_URL.to_string(),
            api_key: None,
            model: DEFAULT_MISTRAL_MODEL.to_string(),
            timeout_secs: 120,
        }
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub cache: CacheConfig,
    pub upstream: UpstreamConfig,
}

impl Config {
    /// `~/.toneshift`
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".toneshift")
    }

    /// `~/.toneshift/config.json`
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Parse a config file. The file must exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data).map_err(|e| {
            ToneError::Config(format!("invalid config file {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the store cannot apply. Redis refuses `SETEX` with a
    /// zero expiry, and `EXPIRE 0` deletes the key outright.
    pub fn validate(&self) -> Result<()> {
        if self.cache.ttl_secs == 0 {
            return Err(ToneError::Config(
                "cache TTL must be at least 1 second".into(),
            ));
        }
        if self.store.history_ttl_secs == Some(0) {
            return Err(ToneError::Config(
                "history TTL must be at least 1 second".into(),
            ));
        }
        Ok(())
    }

    /// Load the effective configuration.
    ///
    /// An explicit `path` must exist; the default path is optional. Process
    /// environment variables are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from_path(p)?,
            None => {
                let default = Self::path();
                if default.exists() {
                    Self::load_from_path(&default)?
                } else {
                    debug!(path = %default.display(), "No config file, using defaults");
                    Self::default()
                }
            }
        };
        let env: HashMap<String, String> = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        config.apply_env(&env)?;
        Ok(config)
    }

    /// Apply environment overrides from `env`.
    pub fn apply_env(&mut self, env: &HashMap<String, String>) -> Result<()> {
        let get = |key: &str| env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        if let Some(v) = get("TONESHIFT_BIND") {
            self.server.bind = v.to_string();
        }
        if let Some(v) = get("TONESHIFT_PORT") {
            self.server.port = parse_num("TONESHIFT_PORT", v)?;
        }
        if let Some(v) = get("TONESHIFT_CORS_ORIGINS") {
            self.server.cors_origins = v
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(v) = get("REDIS_URL") {
            self.store.url = v.to_string();
        }
        if let Some(v) = get("TONESHIFT_STORE") {
            self.store.backend = match v.to_ascii_lowercase().as_str() {
                "redis" => StoreBackend::Redis,
                "memory" => StoreBackend::Memory,
                other => {
                    return Err(ToneError::Config(format!(
                        "TONESHIFT_STORE must be 'redis' or 'memory', got '{other}'"
                    )))
                }
            };
        }
        if let Some(v) = get("TONESHIFT_HISTORY_TTL_SECS") {
            self.store.history_ttl_secs = Some(parse_num("TONESHIFT_HISTORY_TTL_SECS", v)?);
        }
        if let Some(v) = get("TONESHIFT_CACHE_TTL_SECS") {
            self.cache.ttl_secs = parse_num("TONESHIFT_CACHE_TTL_SECS", v)?;
        }
        if let Some(v) = get("TONESHIFT_UPSTREAM_URL") {
            self.upstream.api_url = v.to_string();
        }
        if let Some(v) = get("MISTRAL_API_KEY") {
            self.upstream.api_key = Some(v.to_string());
        }
        if let Some(v) = get("TONESHIFT_MODEL") {
            self.upstream.model = v.to_string();
        }
        if let Some(v) = get("TONESHIFT_UPSTREAM_TIMEOUT_SECS") {
            self.upstream.timeout_secs = parse_num("TONESHIFT_UPSTREAM_TIMEOUT_SECS", v)?;
        }
        self.validate()
    }

    /// Pretty JSON with the API key replaced, for `toneshift config`.
    pub fn to_redacted_json(&self) -> Result<String> {
        let mut shown = self.clone();
        if shown.upstream.api_key.is_some() {
            shown.upstream.api_key = Some("[REDACTED]".to_string());
        }
        Ok(serde_json::to_string_pretty(&shown)?)
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| ToneError::Config(format!("{key} must be a number, got '{value}'")))
}
