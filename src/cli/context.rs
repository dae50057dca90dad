use anyhow::{Context, Result};
use colored::*;
use log::{debug, info};
use std::sync::Arc;

use crate::api::{ReportServerApi, ReportServerClient};
use crate::config::{BASE_URL_ENV, Config, PASSWORD_ENV};
use crate::state::{Favorites, JsonFileStore};
use crate::ui;

/// Loaded config plus a client for the current environment
pub struct CommandContext {
    pub config: Config,
    pub api: Arc<dyn ReportServerApi>,
}

impl CommandContext {
    pub fn connect() -> Result<Self> {
        let config = Config::load()?;

        let base_url_override = std::env::var(BASE_URL_ENV).ok();
        if base_url_override.is_some() {
            debug!("Base URL overridden by {}", BASE_URL_ENV);
        }
        let password = resolve_password(&config)?;

        let settings = config.client_settings(base_url_override, password);
        info!(
            "Connecting to {} (environment: {})",
            settings.base_url,
            config.get_current_environment_name().map(String::as_str).unwrap_or("none")
        );
        let client = ReportServerClient::new(settings).context("Failed to create report server client")?;

        Ok(Self {
            config,
            api: Arc::new(client),
        })
    }

    pub fn print_target(&self) {
        let environment = self
            .config
            .get_current_environment_name()
            .cloned()
            .unwrap_or_else(|| "default".to_string());
        println!(
            "🌍 {} {}",
            environment.bright_green().bold(),
            format!("({})", self.config.effective_base_url(std::env::var(BASE_URL_ENV).ok())).dimmed()
        );
    }
}

/// Password from `SSRS_PASSWORD`, else prompted when the terminal allows it
fn resolve_password(config: &Config) -> Result<Option<String>> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(Some(password));
    }
    let Some(username) = config.get_current_environment().and_then(|env| env.username.as_deref()) else {
        return Ok(None);
    };
    if !ui::is_interactive() {
        debug!("No password available for {} and no terminal to prompt", username);
        return Ok(None);
    }
    ui::prompt_password(username).map(Some)
}

pub fn open_favorites() -> Result<Favorites> {
    let store = JsonFileStore::new(Config::get_storage_path()?);
    Ok(Favorites::load(Box::new(store)))
}
