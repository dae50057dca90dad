use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;
use log::info;
use std::path::PathBuf;

use crate::api::RenderFormat;
use crate::cli::output::print_success;
use crate::config::{Config, Settings};

#[derive(Args)]
pub struct SettingsCommands {
    #[command(subcommand)]
    pub command: SettingsSubcommands,
}

#[derive(Subcommand)]
pub enum SettingsSubcommands {
    /// Show current settings
    Show,
    /// Set the value of a specific setting
    Set {
        /// Setting name (default-format, request-timeout, download-dir)
        name: String,
        /// Setting value
        value: String,
    },
    /// Reset a setting to its default value
    Reset {
        /// Setting name
        name: String,
    },
}

pub fn handle_settings_command(args: SettingsCommands) -> Result<()> {
    match args.command {
        SettingsSubcommands::Show => show_command(),
        SettingsSubcommands::Set { name, value } => set_command(&name, &value),
        SettingsSubcommands::Reset { name } => reset_command(&name),
    }
}

fn show_command() -> Result<()> {
    let config = Config::load()?;
    let settings = config.get_settings();

    println!("{}", "Settings".bold());
    println!("  default-format   {}", settings.default_format.as_str().bright_cyan());
    println!("  request-timeout  {}s", settings.request_timeout_secs);
    println!(
        "  download-dir     {}{}",
        config.download_dir().display(),
        if settings.download_dir.is_none() { " (default)" } else { "" }
    );
    println!("\n{}", format!("Config file: {}", Config::get_config_path()?.display()).dimmed());
    Ok(())
}

fn set_command(name: &str, value: &str) -> Result<()> {
    info!("Setting {} to {}", name, value);
    let mut config = Config::load()?;

    match name {
        "default-format" => {
            let format: RenderFormat = value.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            config.update_default_format(format)?;
            print_success(&format!("Set default-format to {}", format));
        }
        "request-timeout" => {
            let secs: u64 = value.trim_end_matches('s').parse().map_err(|_| {
                anyhow::anyhow!("Invalid value for request-timeout: '{}'. Must be a number of seconds.", value)
            })?;
            config.update_request_timeout(secs)?;
            print_success(&format!("Set request-timeout to {}s", secs));
        }
        "download-dir" => {
            let dir = PathBuf::from(value);
            if !dir.is_dir() {
                anyhow::bail!("Not a directory: {}", dir.display());
            }
            config.update_download_dir(Some(dir.clone()))?;
            print_success(&format!("Set download-dir to {}", dir.display()));
        }
        _ => anyhow::bail!("Unknown setting: {}", name),
    }
    Ok(())
}

fn reset_command(name: &str) -> Result<()> {
    let mut config = Config::load()?;
    let defaults = Settings::default();

    match name {
        "default-format" => config.update_default_format(defaults.default_format)?,
        "request-timeout" => config.update_request_timeout(defaults.request_timeout_secs)?,
        "download-dir" => config.update_download_dir(None)?,
        _ => anyhow::bail!("Unknown setting: {}", name),
    }
    print_success(&format!("Reset {} to its default", name));
    Ok(())
}
