//! Client configuration management.
//!
//! This module handles loading and saving the client configuration, which
//! includes the backend URL, where the session is stored, and the last used
//! username and scenario.
//!
//! Configuration is stored at `~/.config/growthcanvas/config.json`.
//! `GROWTHCANVAS_API_URL` and `GROWTHCANVAS_SESSION_BACKEND` override the
//! file when set.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_BASE_URL;
use crate::auth::{FileSessionStore, KeyringSessionStore, Session};
use crate::models::ScenarioId;

/// Application name used for config/data directory paths
const APP_NAME: &str = "growthcanvas";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const API_URL_ENV: &str = "GROWTHCANVAS_API_URL";
pub const SESSION_BACKEND_ENV: &str = "GROWTHCANVAS_SESSION_BACKEND";

/// Where session values are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    #[default]
    Keyring,
    File,
}

impl FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyring" => Ok(SessionBackend::Keyring),
            "file" => Ok(SessionBackend::File),
            other => Err(anyhow::anyhow!(
                "Unknown session backend '{}' (expected 'keyring' or 'file')",
                other
            )),
        }
    }
}

impl fmt::Display for SessionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionBackend::Keyring => f.write_str("keyring"),
            SessionBackend::File => f.write_str("file"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    #[serde(default)]
    pub session_backend: SessionBackend,
    pub last_username: Option<String>,
    pub last_scenario_id: Option<ScenarioId>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the file-backed session store
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    /// Backend URL, preferring `env_override` over the config file.
    /// Blank values are ignored and trailing slashes dropped.
    pub fn resolve_base_url(&self, env_override: Option<&str>) -> String {
        [env_override, self.api_url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn resolve_session_backend(&self, env_override: Option<&str>) -> Result<SessionBackend> {
        match env_override {
            Some(value) => value
                .parse()
                .with_context(|| format!("Invalid {}", SESSION_BACKEND_ENV)),
            None => Ok(self.session_backend),
        }
    }

    /// Open the configured session store
    pub fn open_session(&self) -> Result<Session> {
        let env = std::env::var(SESSION_BACKEND_ENV).ok();
        let session = match self.resolve_session_backend(env.as_deref())? {
            SessionBackend::Keyring => Session::new(Arc::new(KeyringSessionStore::new())),
            SessionBackend::File => {
                Session::new(Arc::new(FileSessionStore::new(&self.data_dir()?)))
            }
        };
        Ok(session)
    }
}
