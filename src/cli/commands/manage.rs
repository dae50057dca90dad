use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;
use log::info;
use std::path::PathBuf;

use crate::cli::context::CommandContext;
use crate::cli::output::{print_failure, print_success};
use crate::state::{FolderBrowser, ItemRef, Management, paths};
use crate::ui::{prompt_remove_confirmation, with_spinner};

#[derive(Args)]
pub struct FolderCommands {
    #[command(subcommand)]
    pub command: FolderSubcommands,
}

#[derive(Subcommand)]
pub enum FolderSubcommands {
    /// Create a folder
    Create {
        /// Parent folder path
        parent: String,
        /// New folder name
        name: String,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete one or more folders and everything inside them
    Delete {
        /// Folder paths
        #[arg(required = true)]
        paths: Vec<String>,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args)]
pub struct ReportCommands {
    #[command(subcommand)]
    pub command: ReportSubcommands,
}

#[derive(Subcommand)]
pub enum ReportSubcommands {
    /// Upload a report definition (.rdl)
    Upload {
        /// Local .rdl file
        file: PathBuf,
        /// Target folder path
        #[arg(short, long, default_value = "/")]
        folder: String,
        /// Report name (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete one or more reports
    Delete {
        /// Report paths
        #[arg(required = true)]
        paths: Vec<String>,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args)]
pub struct MoveArgs {
    /// Path of the folder or report to move
    pub item: String,
    /// Destination folder path
    pub target: String,
}

pub async fn handle_folder_command(args: FolderCommands) -> Result<()> {
    let context = CommandContext::connect()?;
    let management = Management::new(context.api.clone());

    match args.command {
        FolderSubcommands::Create {
            parent,
            name,
            description,
        } => {
            info!("Creating folder {} in {}", name, parent);
            let browser = FolderBrowser::new(context.api.clone());
            browser.navigate(&parent).await;

            let ack = with_spinner(
                "Creating folder...",
                management.create_folder(&browser, &parent, &name, description.as_deref()),
            )
            .await?;
            print_success(&format!("{} ({})", ack.message, paths::join(&parent, &name)));
        }
        FolderSubcommands::Delete { paths: targets, force } => {
            let items: Vec<ItemRef> = targets.iter().map(|p| ItemRef::folder(paths::normalize(p))).collect();
            delete_items(&context, &management, items, "folder", force).await?;
        }
    }
    Ok(())
}

pub async fn handle_report_command(args: ReportCommands) -> Result<()> {
    let context = CommandContext::connect()?;
    let management = Management::new(context.api.clone());

    match args.command {
        ReportSubcommands::Upload {
            file,
            folder,
            name,
            description,
        } => {
            if !file.exists() {
                anyhow::bail!("Report definition does not exist: {}", file.display());
            }
            info!("Uploading {} to {}", file.display(), folder);
            let browser = FolderBrowser::new(context.api.clone());
            browser.navigate(&folder).await;

            let ack = with_spinner(
                "Uploading report...",
                management.create_report(&browser, &folder, &file, name.as_deref(), description.as_deref()),
            )
            .await?;
            print_success(&ack.message);
        }
        ReportSubcommands::Delete { paths: targets, force } => {
            let items: Vec<ItemRef> = targets.iter().map(|p| ItemRef::report(paths::normalize(p))).collect();
            delete_items(&context, &management, items, "report", force).await?;
        }
    }
    Ok(())
}

async fn delete_items(
    context: &CommandContext,
    management: &Management,
    items: Vec<ItemRef>,
    kind: &str,
    force: bool,
) -> Result<()> {
    let confirmed: Vec<ItemRef> = if force {
        items
    } else {
        let mut confirmed = Vec::new();
        for item in items {
            if prompt_remove_confirmation(kind, &item.path)? {
                confirmed.push(item);
            }
        }
        confirmed
    };
    if confirmed.is_empty() {
        println!("Nothing deleted.");
        return Ok(());
    }

    // Keep the listing of the first item's folder fresh after the deletes
    let browser = FolderBrowser::new(context.api.clone());
    browser.navigate(&paths::parent(&confirmed[0].path)).await;

    let outcome = with_spinner("Deleting...", management.delete_items(&browser, &confirmed)).await;
    for item in &outcome.successful {
        print_success(&format!("Deleted {}", item.path));
    }
    for failure in &outcome.failed {
        print_failure(&format!("{}: {}", failure.item.path, failure.error));
    }

    if !outcome.is_complete_success() {
        anyhow::bail!(
            "{} of {} deletions failed",
            outcome.failed.len(),
            outcome.failed.len() + outcome.successful.len()
        );
    }
    Ok(())
}

pub async fn handle_move_command(args: MoveArgs) -> Result<()> {
    info!("Moving {} to {}", args.item, args.target);
    let context = CommandContext::connect()?;
    let management = Management::new(context.api.clone());
    let browser = FolderBrowser::new(context.api.clone());
    browser.navigate(&args.target).await;

    let ack = with_spinner("Moving...", management.move_item(&browser, &args.item, &args.target)).await?;
    print_success(&ack.message);

    let listing = browser.snapshot().await;
    if let Some(contents) = listing.data {
        println!(
            "{}",
            format!(
                "{} now holds {} folders and {} reports",
                contents.current_path,
                contents.folders.len(),
                contents.reports.len()
            )
            .dimmed()
        );
    }
    Ok(())
}
