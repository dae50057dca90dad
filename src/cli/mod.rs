pub mod app;
pub mod commands;
pub mod context;
pub mod output;

pub use app::{Cli, Commands};
