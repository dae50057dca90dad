use anyhow::Result;
use clap::Parser;
use log::info;

use ssrs_cli::cli::commands::*;
use ssrs_cli::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Log to a file (truncated on each run) so terminal output stays clean
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("ssrs-cli.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    let cli = Cli::parse();
    info!("Starting ssrs-cli");

    match cli.command {
        Commands::Env(args) => handle_env_command(args).await,
        Commands::Test => test_command().await,
        Commands::Whoami => whoami_command().await,
        Commands::Browse(args) => handle_browse_command(args).await,
        Commands::Search(args) => handle_search_command(args).await,
        Commands::Params(args) => handle_params_command(args).await,
        Commands::Render(args) => handle_render_command(args).await,
        Commands::Preview(args) => handle_preview_command(args).await,
        Commands::Folder(args) => handle_folder_command(args).await,
        Commands::Report(args) => handle_report_command(args).await,
        Commands::Move(args) => handle_move_command(args).await,
        Commands::Policies(args) => handle_policy_command(args).await,
        Commands::Roles(args) => handle_roles_command(args).await,
        Commands::UserPolicies(args) => handle_user_policies_command(args).await,
        Commands::Favorites(args) => handle_favorites_command(args),
        Commands::Settings(args) => handle_settings_command(args),
    }
}
