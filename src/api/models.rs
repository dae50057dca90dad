//! Wire types exchanged with the reporting server
//!
//! Field names follow the proxy's camelCase JSON. Dates are kept as the strings
//! the server sends; formatting happens at the presentation layer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::format::RenderFormat;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConnectionResponse {
    pub message: String,
    pub user: String,
    pub report_count: u64,
    pub folder_count: u64,
    #[serde(default)]
    pub reports: Vec<ReportSummary>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub is_authenticated: bool,
    pub name: String,
    pub authentication_type: String,
    pub is_windows_identity: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderItem {
    pub name: String,
    pub path: String,
    pub created_date: String,
    pub modified_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportItem {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub created_date: String,
    pub modified_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowseResponse {
    pub current_path: String,
    #[serde(default)]
    pub folders: Vec<FolderItem>,
    #[serde(default)]
    pub reports: Vec<ReportItem>,
}

impl BrowseResponse {
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.reports.is_empty()
    }

    pub fn find_report(&self, name: &str) -> Option<&ReportItem> {
        self.reports.iter().find(|r| r.name == name)
    }

    pub fn find_folder(&self, name: &str) -> Option<&FolderItem> {
        self.folders.iter().find(|f| f.name == name)
    }
}

/// Declared data type of a report parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterType {
    String,
    Integer,
    Float,
    DateTime,
    Boolean,
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterType::String => "String",
            ParameterType::Integer => "Integer",
            ParameterType::Float => "Float",
            ParameterType::DateTime => "DateTime",
            ParameterType::Boolean => "Boolean",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    pub nullable: bool,
    #[serde(default)]
    pub allow_blank: bool,
    #[serde(default)]
    pub multi_value: bool,
    #[serde(default)]
    pub valid_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub prompt: String,
}

impl ReportParameter {
    /// A parameter must be filled before rendering iff it is not nullable
    pub fn is_required(&self) -> bool {
        !self.nullable
    }

    pub fn display_prompt(&self) -> &str {
        if self.prompt.trim().is_empty() {
            &self.name
        } else {
            &self.prompt
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub report_path: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

/// Binary output of a render call
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub format: RenderFormat,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl RenderedReport {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Report,
    Folder,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemType::Report => f.write_str("Report"),
            ItemType::Folder => f.write_str("Folder"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_date: String,
    pub modified_date: String,
}

/// Security policy: one identity and the roles it holds on an item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyInfo {
    pub group_user_name: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl PolicyInfo {
    pub fn new(group_user_name: impl Into<String>, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            group_user_name: group_user_name.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllRoles {
    pub system_roles: Vec<RoleInfo>,
    pub catalog_roles: Vec<RoleInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPoliciesRequest {
    pub item_path: String,
    pub policies: Vec<PolicyInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroupPolicyItem {
    pub item_path: String,
    #[serde(default)]
    pub item_name: String,
    pub item_type: ItemType,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    pub parent_path: String,
    pub folder_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub parent_path: String,
    pub report_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Base64 encoded report definition (.rdl)
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveItemRequest {
    pub item_path: String,
    pub target_path: String,
}

/// Short confirmation returned by management and security mutations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: String,
}

impl Acknowledgement {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
