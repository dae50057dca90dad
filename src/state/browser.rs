use log::{debug, info};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::error::ConsoleError;
use super::generation::{RequestGeneration, Ticket};
use super::loadable::Loadable;
use super::paths;
use crate::api::{BrowseResponse, ReportServerApi};

pub use super::paths::{breadcrumbs, parent as parent_path};

#[derive(Debug)]
struct BrowserState {
    current_path: String,
    contents: Loadable<BrowseResponse>,
}

/// Folder contents for the active path
///
/// Navigating issues exactly one browse request. A response is applied only if
/// it is the latest request and the active path has not moved on; otherwise it
/// is discarded so a slow response can never overwrite a newer folder.
pub struct FolderBrowser {
    api: Arc<dyn ReportServerApi>,
    generation: RequestGeneration,
    state: RwLock<BrowserState>,
}

impl FolderBrowser {
    pub fn new(api: Arc<dyn ReportServerApi>) -> Self {
        Self {
            api,
            generation: RequestGeneration::new(),
            state: RwLock::new(BrowserState {
                current_path: "/".to_string(),
                contents: Loadable::default(),
            }),
        }
    }

    /// Switch to `path` and load its contents
    pub async fn navigate(&self, path: &str) -> Loadable<BrowseResponse> {
        let path = paths::normalize(path);
        info!("Browsing folder: {}", path);

        let ticket = {
            let mut state = self.state.write().await;
            if state.current_path != path {
                state.contents.data = None;
            }
            state.current_path = path.clone();
            state.contents.start_loading();
            self.generation.issue()
        };

        self.load(path, ticket).await
    }

    /// Reload the active path
    pub async fn refetch(&self) -> Loadable<BrowseResponse> {
        let (path, ticket) = {
            let mut state = self.state.write().await;
            state.contents.start_loading();
            (state.current_path.clone(), self.generation.issue())
        };
        debug!("Refetching folder: {}", path);

        self.load(path, ticket).await
    }

    async fn load(&self, path: String, ticket: Ticket) -> Loadable<BrowseResponse> {
        let result = self
            .api
            .browse_folder(&path)
            .await
            .map_err(|e| ConsoleError::load(format!("Failed to load folder contents for '{}'", path), e));

        let mut state = self.state.write().await;
        if self.generation.is_current(ticket) && state.current_path == path {
            state.contents.resolve(result);
        } else {
            debug!(
                "Discarding stale browse result for '{}' (ticket {}, active path '{}')",
                path,
                ticket.value(),
                state.current_path
            );
        }
        state.contents.clone()
    }

    pub async fn snapshot(&self) -> Loadable<BrowseResponse> {
        self.state.read().await.contents.clone()
    }

    pub async fn current_path(&self) -> String {
        self.state.read().await.current_path.clone()
    }

    pub async fn breadcrumbs(&self) -> Vec<(String, String)> {
        breadcrumbs(&self.current_path().await)
    }

    /// Navigate to the parent of the active folder
    pub async fn go_up(&self) -> Loadable<BrowseResponse> {
        let parent = parent_path(&self.current_path().await);
        self.navigate(&parent).await
    }
}
