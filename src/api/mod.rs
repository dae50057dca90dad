//! Reporting server API
//!
//! Typed operations over the proxy's `Reports`, `Management` and `Security`
//! endpoint groups, with error normalization and render format metadata.

pub mod client;
pub mod constants;
pub mod error;
pub mod format;
pub mod logging;
pub mod models;
pub mod service;

pub use client::{BasicCredentials, ClientSettings, ReportServerClient};
pub use error::{ApiError, ApiResult};
pub use format::RenderFormat;
pub use logging::ApiLogger;
pub use models::{
    Acknowledgement, AllRoles, BrowseResponse, CreateFolderRequest, CreateReportRequest, FolderItem,
    ItemType, MoveItemRequest, ParameterType, PolicyInfo, RenderRequest, RenderedReport, ReportItem,
    ReportParameter, ReportSummary, RoleInfo, SearchResult, TestConnectionResponse, UserGroupPolicyItem,
    UserInfo,
};
pub use service::ReportServerApi;
