use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::*;
use log::info;

use crate::api::RoleInfo;
use crate::cli::context::CommandContext;
use crate::cli::output::{print_hint, print_success, print_table};
use crate::state::policies::filter_roles;
use crate::state::{PolicyDiff, PolicyEditor, PolicyScope};
use crate::ui::{self, prompt_confirmation, with_spinner};

#[derive(Args)]
pub struct PolicyTarget {
    /// Catalog item path (folder or report)
    #[arg(long, required_unless_present = "system", conflicts_with = "system")]
    pub item: Option<String>,
    /// Target site-wide system policies instead of an item
    #[arg(long)]
    pub system: bool,
}

impl PolicyTarget {
    fn scope(&self) -> PolicyScope {
        match &self.item {
            Some(item) if !self.system => PolicyScope::Item(item.clone()),
            _ => PolicyScope::System,
        }
    }
}

#[derive(Args)]
pub struct PolicyCommands {
    #[command(subcommand)]
    pub command: PolicySubcommands,
}

#[derive(Subcommand)]
pub enum PolicySubcommands {
    /// Show who holds which roles
    Show {
        #[command(flatten)]
        target: PolicyTarget,
        /// Only identities containing this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Grant roles to a user or group
    Grant {
        #[command(flatten)]
        target: PolicyTarget,
        /// User or group (e.g., CONTOSO\analysts)
        identity: String,
        /// Roles to grant
        #[arg(required = true)]
        roles: Vec<String>,
        /// Save without confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Revoke roles from a user or group
    Revoke {
        #[command(flatten)]
        target: PolicyTarget,
        /// User or group
        identity: String,
        /// Roles to revoke
        #[arg(required = true)]
        roles: Vec<String>,
        /// Save without confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Remove every role a user or group holds
    Remove {
        #[command(flatten)]
        target: PolicyTarget,
        /// User or group
        identity: String,
        /// Save without confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct RolesArgs {
    /// Only system roles
    #[arg(long, conflicts_with = "catalog")]
    pub system: bool,
    /// Only catalog (item) roles
    #[arg(long)]
    pub catalog: bool,
    /// Only roles whose name or description contains this text
    #[arg(short, long)]
    pub filter: Option<String>,
}

#[derive(Args)]
pub struct UserPoliciesArgs {
    /// User or group to look up
    pub identity: String,
}

pub async fn handle_policy_command(args: PolicyCommands) -> Result<()> {
    let context = CommandContext::connect()?;

    match args.command {
        PolicySubcommands::Show { target, filter } => {
            let editor = load_editor(&context, target.scope()).await?;
            print_policies(&editor, filter.as_deref().unwrap_or(""));
            Ok(())
        }
        PolicySubcommands::Grant {
            target,
            identity,
            roles,
            yes,
        } => {
            let mut editor = load_editor(&context, target.scope()).await?;
            for role in &roles {
                editor.grant_role(&identity, role)?;
            }
            save_changes(&mut editor, yes).await
        }
        PolicySubcommands::Revoke {
            target,
            identity,
            roles,
            yes,
        } => {
            let mut editor = load_editor(&context, target.scope()).await?;
            for role in &roles {
                if !editor.revoke_role(&identity, role) {
                    println!("{}", format!("{} does not hold '{}'", identity, role).yellow());
                }
            }
            save_changes(&mut editor, yes).await
        }
        PolicySubcommands::Remove { target, identity, yes } => {
            let mut editor = load_editor(&context, target.scope()).await?;
            if !editor.remove_policy(&identity) {
                anyhow::bail!("{} has no policy on {}", identity, editor.scope());
            }
            save_changes(&mut editor, yes).await
        }
    }
}

async fn load_editor(context: &CommandContext, scope: PolicyScope) -> Result<PolicyEditor> {
    info!("Loading policy editor for {}", scope);
    let mut editor = PolicyEditor::new(context.api.clone(), scope);
    with_spinner("Loading policies...", editor.load()).await?;
    Ok(editor)
}

fn print_policies(editor: &PolicyEditor, filter: &str) {
    println!("🔐 Policies for {}", editor.scope().to_string().bold());
    let policies = editor.filter_policies(filter);
    if policies.is_empty() {
        print_hint("No matching policies.");
        return;
    }

    let rows: Vec<Vec<String>> = policies
        .iter()
        .map(|p| vec![p.group_user_name.clone(), p.roles.join(", ")])
        .collect();
    print_table(&["User or group", "Roles"], &rows);
}

fn print_diff(diff: &PolicyDiff) {
    for policy in &diff.added {
        println!("  {} {} [{}]", "+".green(), policy.group_user_name, policy.roles.join(", "));
    }
    for change in &diff.changed {
        println!(
            "  {} {} [{}] → [{}]",
            "~".yellow(),
            change.identity,
            change.before.join(", "),
            change.after.join(", ")
        );
    }
    for policy in &diff.removed {
        println!("  {} {} [{}]", "-".red(), policy.group_user_name, policy.roles.join(", "));
    }
}

async fn save_changes(editor: &mut PolicyEditor, yes: bool) -> Result<()> {
    if !editor.can_save() {
        print_hint("No changes to save.");
        return Ok(());
    }

    println!("Changes to {}:", editor.scope().to_string().bold());
    print_diff(&editor.diff());

    if !yes && ui::is_interactive() && !prompt_confirmation("Save these changes?", true)? {
        editor.discard_changes();
        println!("Cancelled.");
        return Ok(());
    }

    let ack = with_spinner("Saving policies...", editor.save()).await?;
    print_success(&ack.message);
    Ok(())
}

pub async fn handle_roles_command(args: RolesArgs) -> Result<()> {
    info!("Executing roles command");
    let context = CommandContext::connect()?;
    let filter = args.filter.as_deref().unwrap_or("");

    let (system, catalog) = if args.system {
        (context.api.list_system_roles().await.context("Failed to load system roles")?, Vec::new())
    } else if args.catalog {
        (Vec::new(), context.api.list_catalog_roles().await.context("Failed to load catalog roles")?)
    } else {
        let all = with_spinner("Loading roles...", context.api.get_all_roles())
            .await
            .context("Failed to load roles")?;
        (all.system_roles, all.catalog_roles)
    };

    print_roles("System roles", &system, filter, args.system);
    print_roles("Catalog roles", &catalog, filter, args.catalog);
    Ok(())
}

fn print_roles(title: &str, roles: &[RoleInfo], filter: &str, requested: bool) {
    if roles.is_empty() && !requested {
        return;
    }
    println!("{}", title.bold());
    let matching = filter_roles(roles, filter);
    if matching.is_empty() {
        print_hint("  No matching roles.");
    }
    for role in matching {
        println!("  {} {}", role.name.bright_cyan(), role.description.dimmed());
    }
    println!();
}

pub async fn handle_user_policies_command(args: UserPoliciesArgs) -> Result<()> {
    info!("Executing user-policies command for {}", args.identity);
    let context = CommandContext::connect()?;

    let items = with_spinner("Collecting policies...", context.api.get_user_policies(&args.identity))
        .await
        .with_context(|| format!("Failed to load policies for {}", args.identity))?;

    println!("👤 {}", args.identity.bold());
    if items.is_empty() {
        print_hint("No explicit policies found.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            vec![
                item.item_path.clone(),
                item.item_type.to_string(),
                item.roles.join(", "),
            ]
        })
        .collect();
    print_table(&["Item", "Type", "Roles"], &rows);
    Ok(())
}
