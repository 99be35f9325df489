//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which records the origin of the hosting page and the last used login,
//! and resolves the API base the request client talks to.
//!
//! Configuration is stored at `~/.config/taskgate/config.json`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "taskgate";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Port of the production reverse proxy that serves the API under `/api`
pub const PROXY_PORT: u16 = 8082;

/// API path behind the reverse proxy
pub const PROXY_API_PATH: &str = "/api";

/// API base used for local development and direct access
pub const DEV_API_BASE: &str = "http://localhost:8000/api";

/// Environment variable overriding the configured origin
pub const ORIGIN_ENV: &str = "TASKGATE_ORIGIN";

/// Environment variable overriding the remembered login
pub const LOGIN_ENV: &str = "TASKGATE_LOGIN";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Origin the application is served from, e.g. `http://tasks.example:8082`
    pub origin: Option<String>,
    pub last_login: Option<String>,
}

impl Config {
    /// Stored configuration, or defaults when nothing has been saved yet
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Config path has no parent: {}", path.display()))?;
        std::fs::create_dir_all(parent)?;
        std::fs::write(&path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Apply `TASKGATE_ORIGIN` / `TASKGATE_LOGIN` on top of the stored values
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(origin) = std::env::var(ORIGIN_ENV) {
            self.origin = Some(origin).filter(|o| !o.is_empty());
        }
        if let Ok(login) = std::env::var(LOGIN_ENV) {
            self.last_login = Some(login).filter(|l| !l.is_empty());
        }
        self
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Cache directory for the backend this configuration talks to.
    /// Each API host and port gets its own subdirectory, so saved cookies never
    /// cross deployments.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join(self.deployment_key()?))
    }

    /// `host-port` of the API base, with anything unsafe in a path replaced
    fn deployment_key(&self) -> Result<String> {
        let base = self.api_base()?;
        let url = Url::parse(&base).with_context(|| format!("Invalid API base: {}", base))?;
        let host = url.host_str().unwrap_or("local");
        let key = match url.port_or_known_default() {
            Some(port) => format!("{}-{}", host, port),
            None => host.to_string(),
        };
        Ok(key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
            .collect())
    }

    pub fn api_base(&self) -> Result<String> {
        resolve_api_base(self.origin.as_deref())
    }
}

/// Pick the API base for the deployment the page is served from.
///
/// Pages served through the reverse proxy port reach the API at `/api` on the
/// same origin; everything else talks to the development backend.
pub fn resolve_api_base(origin: Option<&str>) -> Result<String> {
    let Some(origin) = origin else {
        return Ok(DEV_API_BASE.to_string());
    };

    let url = Url::parse(origin).with_context(|| format!("Invalid origin: {}", origin))?;
    if url.port_or_known_default() != Some(PROXY_PORT) {
        return Ok(DEV_API_BASE.to_string());
    }

    let host = url
        .host_str()
        .ok_or_else(|| anyhow::anyhow!("Origin has no host: {}", origin))?;
    Ok(format!("{}://{}:{}{}", url.scheme(), host, PROXY_PORT, PROXY_API_PATH))
}
