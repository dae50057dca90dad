pub mod browse;
pub mod connection;
pub mod env;
pub mod favorites;
pub mod manage;
pub mod report;
pub mod security;
pub mod settings;

pub use browse::{BrowseArgs, SearchArgs, handle_browse_command, handle_search_command};
pub use connection::{test_command, whoami_command};
pub use env::{EnvCommands, handle_env_command};
pub use favorites::{FavoritesCommands, handle_favorites_command};
pub use manage::{
    FolderCommands, MoveArgs, ReportCommands, handle_folder_command, handle_move_command, handle_report_command,
};
pub use report::{
    ParamsArgs, PreviewArgs, RenderArgs, handle_params_command, handle_preview_command, handle_render_command,
};
pub use security::{
    PolicyCommands, RolesArgs, UserPoliciesArgs, handle_policy_command, handle_roles_command,
    handle_user_policies_command,
};
pub use settings::{SettingsCommands, handle_settings_command};
