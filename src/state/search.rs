use log::{debug, info};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::error::ConsoleError;
use super::generation::RequestGeneration;
use super::loadable::Loadable;
use crate::api::{ReportServerApi, SearchResult};

#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub query: String,
    pub results: Loadable<Vec<SearchResult>>,
}

/// Catalog search; only the latest query's results are kept
pub struct SearchSession {
    api: Arc<dyn ReportServerApi>,
    generation: RequestGeneration,
    state: RwLock<SearchState>,
}

impl SearchSession {
    pub fn new(api: Arc<dyn ReportServerApi>) -> Self {
        Self {
            api,
            generation: RequestGeneration::new(),
            state: RwLock::new(SearchState::default()),
        }
    }

    /// Run a search. A blank query clears the results without a request.
    pub async fn search(&self, query: &str) -> SearchState {
        let query = query.trim().to_string();

        let ticket = {
            let mut state = self.state.write().await;
            state.query = query.clone();
            if query.is_empty() {
                self.generation.invalidate();
                state.results.clear();
                return state.clone();
            }
            state.results.start_loading();
            self.generation.issue()
        };
        info!("Searching catalog for '{}'", query);

        let result = self
            .api
            .search_reports(&query)
            .await
            .map_err(|e| ConsoleError::load(format!("Search for '{}' failed", query), e));

        let mut state = self.state.write().await;
        if self.generation.is_current(ticket) {
            if let Ok(results) = &result {
                debug!("Search '{}' returned {} items", query, results.len());
            }
            state.results.resolve(result);
        } else {
            debug!("Discarding stale search results for '{}'", query);
        }
        state.clone()
    }

    pub async fn clear(&self) -> SearchState {
        self.search("").await
    }

    pub async fn snapshot(&self) -> SearchState {
        self.state.read().await.clone()
    }
}
