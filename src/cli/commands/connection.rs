use anyhow::{Context, Result};
use colored::*;
use log::info;

use crate::cli::context::CommandContext;
use crate::cli::output::{format_date, print_failure, print_success};
use crate::state::ConnectionState;
use crate::ui::with_spinner;

/// Test connectivity and show catalog counts plus the authenticated user
pub async fn test_command() -> Result<()> {
    info!("Executing test command");
    let context = CommandContext::connect()?;
    context.print_target();

    let connection = ConnectionState::new(context.api.clone());
    let status = with_spinner("Testing connection...", connection.test()).await;

    if let Some(error) = &status.connection.error {
        print_failure(&error.to_string());
        anyhow::bail!("Connection test failed");
    }

    if let Some(response) = &status.connection.data {
        print_success(&response.message);
        println!("  User:     {}", response.user.bright_cyan());
        println!("  Reports:  {}", response.report_count);
        println!("  Folders:  {}", response.folder_count);
        println!("  Checked:  {}", format_date(&response.timestamp).dimmed());
        if !response.reports.is_empty() {
            println!("\n{}", "Sample reports:".bold());
            for report in &response.reports {
                println!("  📄 {} {}", report.name, report.path.dimmed());
            }
        }
    }

    match (&status.user.data, &status.user.error) {
        (Some(user), _) => println!(
            "\n🔐 {} via {}{}",
            user.name.bold(),
            user.authentication_type,
            if user.is_windows_identity { " (Windows identity)" } else { "" }
        ),
        (None, Some(e)) => print_failure(&e.to_string()),
        (None, None) => {}
    }
    Ok(())
}

/// Show who the server thinks we are
pub async fn whoami_command() -> Result<()> {
    info!("Executing whoami command");
    let context = CommandContext::connect()?;

    let user = with_spinner("Fetching user...", context.api.current_user())
        .await
        .context("Failed to fetch current user")?;

    println!("{}", user.name.bold());
    println!("  Authenticated:        {}", if user.is_authenticated { "yes".green() } else { "no".red() });
    println!("  Authentication type:  {}", user.authentication_type);
    println!("  Windows identity:     {}", user.is_windows_identity);
    Ok(())
}
