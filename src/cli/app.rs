use super::commands::{
    BrowseArgs, EnvCommands, FavoritesCommands, FolderCommands, MoveArgs, ParamsArgs, PolicyCommands, PreviewArgs,
    RenderArgs, ReportCommands, RolesArgs, SearchArgs, SettingsCommands, UserPoliciesArgs,
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ssrs-cli")]
#[command(version)]
#[command(about = "Browse, render and administer SQL Server Reporting Services through its REST proxy")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report server environment management
    Env(EnvCommands),
    /// Test the connection to the current environment
    Test,
    /// Show the authenticated user
    Whoami,
    /// List the contents of a folder
    Browse(BrowseArgs),
    /// Search reports and folders by name
    Search(SearchArgs),
    /// Show the parameters a report accepts
    Params(ParamsArgs),
    /// Render a report to a file
    Render(RenderArgs),
    /// Interactive PDF preview while editing parameters
    Preview(PreviewArgs),
    /// Create or delete folders
    Folder(FolderCommands),
    /// Upload or delete reports
    Report(ReportCommands),
    /// Move a folder or report
    Move(MoveArgs),
    /// View and edit security policies
    Policies(PolicyCommands),
    /// List assignable roles
    Roles(RolesArgs),
    /// Show every item a user or group has roles on
    UserPolicies(UserPoliciesArgs),
    /// Favorite reports
    Favorites(FavoritesCommands),
    /// Application settings management
    Settings(SettingsCommands),
}
