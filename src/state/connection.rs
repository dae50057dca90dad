use log::{info, warn};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::error::ConsoleError;
use super::loadable::Loadable;
use crate::api::{ReportServerApi, TestConnectionResponse, UserInfo};

#[derive(Debug, Clone, Default)]
pub struct ConnectionStatus {
    pub connection: Loadable<TestConnectionResponse>,
    pub user: Loadable<UserInfo>,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        self.connection.is_loaded()
    }
}

/// Result of the last connection test. Only re-run on request.
pub struct ConnectionState {
    api: Arc<dyn ReportServerApi>,
    state: RwLock<ConnectionStatus>,
}

impl ConnectionState {
    pub fn new(api: Arc<dyn ReportServerApi>) -> Self {
        Self {
            api,
            state: RwLock::new(ConnectionStatus::default()),
        }
    }

    /// Test the connection and fetch the current user together
    pub async fn test(&self) -> ConnectionStatus {
        {
            let mut state = self.state.write().await;
            state.connection.start_loading();
            state.user.start_loading();
        }
        info!("Testing connection to report server");

        let (connection, user) = tokio::join!(self.api.test_connection(), self.api.current_user());

        let mut state = self.state.write().await;
        match &connection {
            Ok(response) => info!(
                "Connected as {} ({} reports, {} folders)",
                response.user, response.report_count, response.folder_count
            ),
            Err(e) => warn!("Connection test failed: {}", e),
        }
        state.connection.resolve(connection.map_err(ConsoleError::Connectivity));
        state
            .user
            .resolve(user.map_err(|e| ConsoleError::load("Failed to load current user", e)));
        state.clone()
    }

    pub async fn snapshot(&self) -> ConnectionStatus {
        self.state.read().await.clone()
    }
}
