//! Client-side state containers
//!
//! Each container owns one slice of console state (folder listing, parameter
//! form, preview, policies, search) and exposes snapshots the CLI renders.
//! Containers that race requests use a [`RequestGeneration`] so only the
//! latest response is ever applied.

pub mod browser;
pub mod connection;
pub mod error;
pub mod favorites;
pub mod generation;
pub mod loadable;
pub mod management;
pub mod parameters;
pub mod paths;
pub mod policies;
pub mod render;
pub mod search;
pub mod values;
pub mod workbench;

pub use browser::FolderBrowser;
pub use connection::{ConnectionState, ConnectionStatus};
pub use error::ConsoleError;
pub use favorites::{Favorites, JsonFileStore, KeyValueStore, MemoryStore};
pub use generation::{RequestGeneration, Ticket};
pub use loadable::Loadable;
pub use management::{BulkFailure, BulkOutcome, ItemRef, Management};
pub use parameters::{ParameterSession, ParameterState};
pub use policies::{PolicyDiff, PolicyEditor, PolicyScope, RoleChange};
pub use render::{PreviewController, PreviewDocument, PreviewState, Renderer, download_file_name};
pub use search::{SearchSession, SearchState};
pub use values::{ParameterValue, ParameterValues};
pub use workbench::ReportWorkbench;
