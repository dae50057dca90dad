use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{BasicCredentials, ClientSettings, RenderFormat, constants};

pub const BASE_URL_ENV: &str = "SSRS_API_BASE_URL";
pub const PASSWORD_ENV: &str = "SSRS_PASSWORD";

/// One report server the CLI can talk to. Passwords are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            username: None,
            accept_invalid_certs: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub current_environment: Option<String>,
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentConfig>,
    #[serde(default)]
    pub settings: Settings,
    #[serde(skip)]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub default_format: RenderFormat,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_dir: Option<PathBuf>,
}

fn default_request_timeout() -> u64 {
    60
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: RenderFormat::default(),
            request_timeout_secs: default_request_timeout(),
            download_dir: None,
        }
    }
}

impl Config {
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("ssrs-cli")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".ssrs-cli")
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
            info!("Created config directory: {:?}", config_dir);
        }

        Ok(config_dir)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.toml"))
    }

    /// File backing the favorites key-value store
    pub fn get_storage_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("storage.json"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, using default config");
            return Ok(Self {
                path: Some(config_path.to_path_buf()),
                ..Self::default()
            });
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let mut config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
        config.path = Some(config_path.to_path_buf());

        debug!("Loaded config with {} environments", config.environments.len());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = match &self.path {
            Some(path) => path.clone(),
            None => Self::get_config_path()?,
        };
        debug!("Saving config to: {:?}", config_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let config_content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Config saved successfully");
        Ok(())
    }

    pub fn add_environment(&mut self, name: String, environment: EnvironmentConfig) -> Result<()> {
        info!("Adding environment: {} ({})", name, environment.base_url);
        self.environments.insert(name.clone(), environment);

        // First environment becomes the current one
        if self.current_environment.is_none() {
            self.current_environment = Some(name.clone());
            info!("Set {} as current environment", name);
        }

        self.save()
    }

    pub fn get_current_environment(&self) -> Option<&EnvironmentConfig> {
        let current_env = self.current_environment.as_ref()?;
        self.environments.get(current_env)
    }

    pub fn get_current_environment_name(&self) -> Option<&String> {
        self.current_environment.as_ref()
    }

    pub fn set_current_environment(&mut self, name: String) -> Result<()> {
        if !self.environments.contains_key(&name) {
            anyhow::bail!("Environment '{}' not found", name);
        }

        info!("Setting current environment to: {}", name);
        self.current_environment = Some(name);
        self.save()
    }

    /// Environment names in alphabetical order
    pub fn list_environments(&self) -> Vec<&String> {
        let mut names: Vec<&String> = self.environments.keys().collect();
        names.sort();
        names
    }

    pub fn remove_environment(&mut self, name: &str) -> Result<()> {
        if self.environments.remove(name).is_none() {
            anyhow::bail!("Environment '{}' not found", name);
        }
        info!("Removing environment: {}", name);

        if self.current_environment.as_deref() == Some(name) {
            warn!("Removed current environment, clearing current selection");
            self.current_environment = None;
        }

        self.save()
    }

    pub fn get_settings(&self) -> &Settings {
        &self.settings
    }

    pub fn update_default_format(&mut self, format: RenderFormat) -> Result<()> {
        info!("Updating default format to: {}", format);
        self.settings.default_format = format;
        self.save()
    }

    pub fn update_request_timeout(&mut self, secs: u64) -> Result<()> {
        if secs == 0 {
            anyhow::bail!("Request timeout must be at least 1 second");
        }
        info!("Updating request timeout to: {}s", secs);
        self.settings.request_timeout_secs = secs;
        self.save()
    }

    pub fn update_download_dir(&mut self, dir: Option<PathBuf>) -> Result<()> {
        info!("Updating download directory to: {:?}", dir);
        self.settings.download_dir = dir;
        self.save()
    }

    /// Directory exports are written to when no output path is given
    pub fn download_dir(&self) -> PathBuf {
        self.settings
            .download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Base URL for the current environment, with `base_url_override` (from
    /// `SSRS_API_BASE_URL`) taking precedence
    pub fn effective_base_url(&self, base_url_override: Option<String>) -> String {
        base_url_override
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.get_current_environment().map(|env| env.base_url.clone()))
            .unwrap_or_else(|| constants::DEFAULT_BASE_URL.to_string())
    }

    /// Client settings for the current environment.
    ///
    /// Credentials are attached only when the environment names a user and a
    /// password was supplied.
    pub fn client_settings(&self, base_url_override: Option<String>, password: Option<String>) -> ClientSettings {
        let environment = self.get_current_environment().cloned().unwrap_or_default();
        let credentials = match (environment.username, password) {
            (Some(username), Some(password)) => Some(BasicCredentials { username, password }),
            _ => None,
        };

        ClientSettings {
            base_url: self.effective_base_url(base_url_override),
            credentials,
            accept_invalid_certs: environment.accept_invalid_certs,
            timeout: Duration::from_secs(self.settings.request_timeout_secs),
            request_logging: true,
        }
    }
}
