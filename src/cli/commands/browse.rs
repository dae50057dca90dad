use anyhow::Result;
use clap::Args;
use colored::*;
use log::info;

use crate::api::{BrowseResponse, ItemType};
use crate::cli::context::{CommandContext, open_favorites};
use crate::cli::output::{format_date, print_hint, print_table};
use crate::state::{FolderBrowser, SearchSession};
use crate::ui::with_spinner;

#[derive(Args)]
pub struct BrowseArgs {
    /// Folder path to list (defaults to the root)
    #[arg(default_value = "/")]
    pub path: String,
    /// Show created/modified dates and descriptions
    #[arg(short, long)]
    pub long: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Text to search for in report and folder names
    pub query: String,
}

pub async fn handle_browse_command(args: BrowseArgs) -> Result<()> {
    info!("Executing browse command for {}", args.path);
    let context = CommandContext::connect()?;
    let browser = FolderBrowser::new(context.api.clone());

    let contents = with_spinner("Loading folder...", browser.navigate(&args.path)).await;

    let crumbs: Vec<String> = browser.breadcrumbs().await.into_iter().map(|(label, _)| label).collect();
    println!("📂 {}", crumbs.join(" › ").bold());

    if let Some(error) = contents.error {
        anyhow::bail!(error);
    }
    let Some(listing) = contents.data else {
        return Ok(());
    };

    let favorites = open_favorites()?;
    print_listing(&listing, args.long, |path| favorites.contains(path));
    Ok(())
}

fn print_listing(listing: &BrowseResponse, long: bool, is_favorite: impl Fn(&str) -> bool) {
    if listing.is_empty() {
        print_hint("This folder is empty.");
        return;
    }

    if long {
        let mut rows = Vec::new();
        for folder in &listing.folders {
            rows.push(vec![
                format!("📁 {}", folder.name),
                format_date(&folder.modified_date),
                folder.description.clone().unwrap_or_default(),
            ]);
        }
        for report in &listing.reports {
            let star = if is_favorite(&report.path) { " ★" } else { "" };
            rows.push(vec![
                format!("📄 {}{}", report.name, star),
                format_date(&report.modified_date),
                report.description.clone().unwrap_or_default(),
            ]);
        }
        print_table(&["Name", "Modified", "Description"], &rows);
        return;
    }

    for folder in &listing.folders {
        println!("  📁 {}", folder.name.bright_blue().bold());
    }
    for report in &listing.reports {
        let star = if is_favorite(&report.path) {
            " ★".yellow().to_string()
        } else {
            String::new()
        };
        println!("  📄 {}{}", report.name, star);
    }
    print_hint(&format!(
        "{} folders, {} reports",
        listing.folders.len(),
        listing.reports.len()
    ));
}

pub async fn handle_search_command(args: SearchArgs) -> Result<()> {
    info!("Executing search command for '{}'", args.query);
    let context = CommandContext::connect()?;
    let session = SearchSession::new(context.api.clone());

    let state = with_spinner("Searching...", session.search(&args.query)).await;
    if let Some(error) = state.results.error {
        anyhow::bail!(error);
    }

    let results = state.results.data.unwrap_or_default();
    if results.is_empty() {
        if state.query.is_empty() {
            print_hint("Enter a search term.");
        } else {
            println!("No items match '{}'.", state.query);
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = results
        .iter()
        .map(|item| {
            let icon = match item.item_type {
                ItemType::Folder => "📁",
                ItemType::Report => "📄",
            };
            vec![
                format!("{} {}", icon, item.name),
                item.path.clone(),
                format_date(&item.modified_date),
            ]
        })
        .collect();
    print_table(&["Name", "Path", "Modified"], &rows);
    print_hint(&format!("{} results", results.len()));
    Ok(())
}
