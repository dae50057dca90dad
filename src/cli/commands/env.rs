use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;
use log::{error, info};

use crate::cli::context::CommandContext;
use crate::cli::output::{print_failure, print_hint, print_success};
use crate::config::{Config, EnvironmentConfig};
use crate::state::ConnectionState;
use crate::ui::{self, prompt_confirmation, prompt_environment_selection, text_input};

#[derive(Args)]
pub struct EnvCommands {
    #[command(subcommand)]
    pub command: EnvSubcommands,
}

#[derive(Subcommand)]
pub enum EnvSubcommands {
    /// Add a report server environment
    Add {
        /// Name for this environment (e.g., "production", "test")
        name: Option<String>,
        /// API base URL (e.g., https://reports.contoso.com/api)
        #[arg(long)]
        url: Option<String>,
        /// Username for basic authentication
        #[arg(long)]
        username: Option<String>,
        /// Accept self-signed TLS certificates
        #[arg(long)]
        accept_invalid_certs: bool,
    },
    /// List configured environments
    List,
    /// Select the current environment
    Select {
        /// Environment name to select
        name: Option<String>,
    },
    /// Remove an environment
    Remove {
        /// Environment name to remove
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Show the current environment and test its connection
    Status,
}

pub async fn handle_env_command(args: EnvCommands) -> Result<()> {
    match args.command {
        EnvSubcommands::Add {
            name,
            url,
            username,
            accept_invalid_certs,
        } => add_command(name, url, username, accept_invalid_certs),
        EnvSubcommands::List => list_command(),
        EnvSubcommands::Select { name } => select_command(name),
        EnvSubcommands::Remove { name, force } => remove_command(&name, force),
        EnvSubcommands::Status => status_command().await,
    }
}

fn add_command(
    name: Option<String>,
    url: Option<String>,
    username: Option<String>,
    accept_invalid_certs: bool,
) -> Result<()> {
    info!("Adding environment");
    let mut config = Config::load()?;

    let name = match name {
        Some(name) => name,
        None => text_input("Environment name (e.g., 'production', 'test')", None)?,
    };
    if name.trim().is_empty() {
        anyhow::bail!("Environment name cannot be empty");
    }

    if config.environments.contains_key(&name)
        && !prompt_confirmation(&format!("Environment '{}' already exists. Overwrite?", name), false)?
    {
        println!("Cancelled.");
        return Ok(());
    }

    let base_url = match url {
        Some(url) => url,
        None => text_input("API base URL", Some(crate::api::constants::DEFAULT_BASE_URL))?,
    };
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        anyhow::bail!("Base URL must start with http:// or https://");
    }

    let username = match username {
        Some(username) => Some(username),
        None if ui::is_interactive() => {
            let entered = text_input("Username (leave empty for none)", Some(""))?;
            Some(entered).filter(|u| !u.trim().is_empty())
        }
        None => None,
    };

    config.add_environment(
        name.clone(),
        EnvironmentConfig {
            base_url,
            username,
            accept_invalid_certs,
        },
    )?;
    print_success(&format!("Added environment: {}", name));
    Ok(())
}

fn list_command() -> Result<()> {
    let config = Config::load()?;
    let environments = config.list_environments();

    if environments.is_empty() {
        println!("No environments configured.");
        print_hint("Run 'ssrs-cli env add' to create one.");
        return Ok(());
    }

    for env_name in environments {
        let Some(environment) = config.environments.get(env_name) else {
            continue;
        };
        let marker = if config.get_current_environment_name() == Some(env_name) {
            "●".bright_green()
        } else {
            "○".normal()
        };
        println!("  {} {} {}", marker, env_name.bold(), environment.base_url.dimmed());
    }
    Ok(())
}

fn select_command(name: Option<String>) -> Result<()> {
    let mut config = Config::load()?;
    let env_names: Vec<String> = config.list_environments().into_iter().cloned().collect();

    if env_names.is_empty() {
        println!("No environments configured. Run 'ssrs-cli env add' to create one.");
        return Ok(());
    }

    let selected = match name {
        Some(name) => name,
        None => prompt_environment_selection(&env_names, config.get_current_environment_name())?,
    };

    config.set_current_environment(selected.clone())?;
    print_success(&format!("Selected environment: {}", selected));
    Ok(())
}

fn remove_command(name: &str, force: bool) -> Result<()> {
    let mut config = Config::load()?;
    if !config.environments.contains_key(name) {
        anyhow::bail!("Environment '{}' not found", name);
    }

    if !force && !prompt_confirmation(&format!("Remove environment '{}'?", name), false)? {
        println!("Cancelled.");
        return Ok(());
    }

    config.remove_environment(name)?;
    print_success(&format!("Removed environment: {}", name));
    Ok(())
}

async fn status_command() -> Result<()> {
    info!("Executing env status command");
    let context = CommandContext::connect()?;

    println!("{}", "Report Server Status".bold());
    context.print_target();
    if let Some(environment) = context.config.get_current_environment() {
        println!("  Username: {}", environment.username.as_deref().unwrap_or("(none)"));
        println!(
            "  Certificates: {}",
            if environment.accept_invalid_certs {
                "any (validation disabled)"
            } else {
                "validated"
            }
        );
    } else {
        print_hint("No environment selected; using the default URL.");
    }

    println!();
    let connection = ConnectionState::new(context.api.clone());
    let status = ui::with_spinner("Testing connection...", connection.test()).await;
    match (&status.connection.data, &status.connection.error) {
        (Some(response), _) => print_success(&format!("{} ({})", response.message, response.user)),
        (None, Some(e)) => {
            error!("Connection test failed: {}", e);
            print_failure(&e.to_string());
        }
        (None, None) => print_failure("No response from server"),
    }
    Ok(())
}
