use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::{info, warn};
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use super::browser::FolderBrowser;
use super::error::ConsoleError;
use super::paths;
use crate::api::{
    Acknowledgement, CreateFolderRequest, CreateReportRequest, ItemType, MoveItemRequest, ReportServerApi,
};

/// Characters the report server refuses in item names
static RESERVED_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\@$&*+=<>?:;,|"]"#).expect("valid reserved character pattern"));

const MAX_NAME_LENGTH: usize = 260;

/// Validate a folder or report name before it is sent to the server
pub fn validate_item_name(name: &str) -> Result<(), ConsoleError> {
    let invalid = |reason: &str| {
        Err(ConsoleError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    let trimmed = name.trim();
    if trimmed.is_empty() {
        return invalid("name cannot be empty");
    }
    if trimmed.len() != name.len() {
        return invalid("name cannot start or end with whitespace");
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return invalid("name is longer than 260 characters");
    }
    if let Some(found) = RESERVED_CHARACTERS.find(name) {
        return invalid(&format!("'{}' is a reserved character", found.as_str()));
    }
    Ok(())
}

/// A catalog item targeted by a delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub path: String,
    pub item_type: ItemType,
}

impl ItemRef {
    pub fn report(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            item_type: ItemType::Report,
        }
    }

    pub fn folder(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            item_type: ItemType::Folder,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkFailure {
    pub item: ItemRef,
    pub error: ConsoleError,
}

/// Per-item result of a bulk operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkOutcome {
    pub successful: Vec<ItemRef>,
    pub failed: Vec<BulkFailure>,
}

impl BulkOutcome {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Catalog mutations. Each one refetches the browser so the listing reflects it.
pub struct Management {
    api: Arc<dyn ReportServerApi>,
}

impl Management {
    pub fn new(api: Arc<dyn ReportServerApi>) -> Self {
        Self { api }
    }

    pub async fn create_folder(
        &self,
        browser: &FolderBrowser,
        parent_path: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Acknowledgement, ConsoleError> {
        validate_item_name(name)?;
        let parent_path = paths::normalize(parent_path);
        info!("Creating folder '{}' in {}", name, parent_path);

        let request = CreateFolderRequest {
            parent_path: parent_path.clone(),
            folder_name: name.to_string(),
            description: description.map(str::to_string),
        };
        let ack = self
            .api
            .create_folder(&request)
            .await
            .map_err(|e| ConsoleError::persistence(format!("Create folder '{}'", name), e))?;

        browser.refetch().await;
        Ok(ack)
    }

    /// Upload a report definition (`.rdl`) from disk.
    ///
    /// The report name defaults to the file stem.
    pub async fn create_report(
        &self,
        browser: &FolderBrowser,
        parent_path: &str,
        definition_file: &Path,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Acknowledgement, ConsoleError> {
        let name = match name {
            Some(name) => name.to_string(),
            None => definition_file
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
                .ok_or_else(|| ConsoleError::InvalidName {
                    name: definition_file.display().to_string(),
                    reason: "cannot derive a report name from the file name".to_string(),
                })?,
        };
        validate_item_name(&name)?;

        let definition = tokio::fs::read(definition_file).await?;
        let parent_path = paths::normalize(parent_path);
        info!(
            "Uploading report '{}' to {} ({} bytes)",
            name,
            parent_path,
            definition.len()
        );

        let request = CreateReportRequest {
            parent_path,
            report_name: name.clone(),
            description: description.map(str::to_string),
            definition: STANDARD.encode(&definition),
        };
        let ack = self
            .api
            .create_report(&request)
            .await
            .map_err(|e| ConsoleError::persistence(format!("Upload report '{}'", name), e))?;

        browser.refetch().await;
        Ok(ack)
    }

    pub async fn delete_item(&self, browser: &FolderBrowser, item: &ItemRef) -> Result<Acknowledgement, ConsoleError> {
        let ack = self.delete_one(item).await?;
        browser.refetch().await;
        Ok(ack)
    }

    /// Delete every item, collecting failures instead of stopping at the first
    pub async fn delete_items(&self, browser: &FolderBrowser, items: &[ItemRef]) -> BulkOutcome {
        let mut outcome = BulkOutcome::default();
        for item in items {
            match self.delete_one(item).await {
                Ok(_) => outcome.successful.push(item.clone()),
                Err(error) => {
                    warn!("Failed to delete {}: {}", item.path, error);
                    outcome.failed.push(BulkFailure {
                        item: item.clone(),
                        error,
                    });
                }
            }
        }
        info!(
            "Bulk delete finished: {} deleted, {} failed",
            outcome.successful.len(),
            outcome.failed.len()
        );

        browser.refetch().await;
        outcome
    }

    /// Move an item into `target_folder`
    pub async fn move_item(
        &self,
        browser: &FolderBrowser,
        item_path: &str,
        target_folder: &str,
    ) -> Result<Acknowledgement, ConsoleError> {
        let request = MoveItemRequest {
            item_path: paths::normalize(item_path),
            target_path: paths::normalize(target_folder),
        };
        info!("Moving {} to {}", request.item_path, request.target_path);

        let ack = self
            .api
            .move_item(&request)
            .await
            .map_err(|e| ConsoleError::persistence(format!("Move '{}'", request.item_path), e))?;

        browser.refetch().await;
        Ok(ack)
    }

    async fn delete_one(&self, item: &ItemRef) -> Result<Acknowledgement, ConsoleError> {
        info!("Deleting {} {}", item.item_type, item.path);
        let result = match item.item_type {
            ItemType::Folder => self.api.delete_folder(&item.path).await,
            ItemType::Report => self.api.delete_report(&item.path).await,
        };
        result.map_err(|e| ConsoleError::persistence(format!("Delete '{}'", item.path), e))
    }
}
