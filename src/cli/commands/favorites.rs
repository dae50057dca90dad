use anyhow::Result;
use clap::{Args, Subcommand};
use log::info;

use crate::cli::context::open_favorites;
use crate::cli::output::{print_hint, print_success};
use crate::state::paths;

#[derive(Args)]
pub struct FavoritesCommands {
    #[command(subcommand)]
    pub command: FavoritesSubcommands,
}

#[derive(Subcommand)]
pub enum FavoritesSubcommands {
    /// List favorite reports
    List,
    /// Mark a report as favorite
    Add {
        /// Report path
        report: String,
    },
    /// Remove a report from favorites
    Remove {
        /// Report path
        report: String,
    },
    /// Add the report if missing, remove it otherwise
    Toggle {
        /// Report path
        report: String,
    },
}

pub fn handle_favorites_command(args: FavoritesCommands) -> Result<()> {
    let mut favorites = open_favorites()?;

    match args.command {
        FavoritesSubcommands::List => {
            if favorites.list().is_empty() {
                println!("No favorites yet.");
                print_hint("Run 'ssrs-cli favorites add <REPORT>' to add one.");
            }
            for path in favorites.list() {
                println!("  ★ {}", path);
            }
        }
        FavoritesSubcommands::Add { report } => {
            let report = paths::normalize(&report);
            if favorites.add(&report) {
                info!("Added favorite {}", report);
                print_success(&format!("Added {} to favorites", report));
            } else {
                println!("{} is already a favorite", report);
            }
        }
        FavoritesSubcommands::Remove { report } => {
            let report = paths::normalize(&report);
            if !favorites.remove(&report) {
                anyhow::bail!("{} is not a favorite", report);
            }
            print_success(&format!("Removed {} from favorites", report));
        }
        FavoritesSubcommands::Toggle { report } => {
            let report = paths::normalize(&report);
            if favorites.toggle(&report) {
                print_success(&format!("Added {} to favorites", report));
            } else {
                print_success(&format!("Removed {} from favorites", report));
            }
        }
    }
    Ok(())
}
