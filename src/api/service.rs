//! The typed surface of the reporting server
//!
//! State containers depend on this trait rather than on the HTTP client so they
//! can be driven by an in-memory server in tests.

use async_trait::async_trait;

use super::error::ApiResult;
use super::format::RenderFormat;
use super::models::{
    Acknowledgement, AllRoles, BrowseResponse, CreateFolderRequest, CreateReportRequest,
    MoveItemRequest, PolicyInfo, RenderRequest, RenderedReport, ReportParameter, RoleInfo,
    SearchResult, TestConnectionResponse, UserGroupPolicyItem, UserInfo,
};

#[async_trait]
pub trait ReportServerApi: Send + Sync {
    async fn test_connection(&self) -> ApiResult<TestConnectionResponse>;

    async fn current_user(&self) -> ApiResult<UserInfo>;

    /// List folders and reports directly under `folder_path`
    async fn browse_folder(&self, folder_path: &str) -> ApiResult<BrowseResponse>;

    async fn get_report_parameters(&self, report_path: &str) -> ApiResult<Vec<ReportParameter>>;

    async fn render_report(&self, request: &RenderRequest, format: RenderFormat) -> ApiResult<RenderedReport>;

    async fn search_reports(&self, query: &str) -> ApiResult<Vec<SearchResult>>;

    async fn create_folder(&self, request: &CreateFolderRequest) -> ApiResult<Acknowledgement>;

    async fn delete_folder(&self, folder_path: &str) -> ApiResult<Acknowledgement>;

    async fn create_report(&self, request: &CreateReportRequest) -> ApiResult<Acknowledgement>;

    async fn delete_report(&self, report_path: &str) -> ApiResult<Acknowledgement>;

    async fn move_item(&self, request: &MoveItemRequest) -> ApiResult<Acknowledgement>;

    async fn get_policies(&self, item_path: &str) -> ApiResult<Vec<PolicyInfo>>;

    /// Replace the full policy list of an item
    async fn set_policies(&self, item_path: &str, policies: &[PolicyInfo]) -> ApiResult<Acknowledgement>;

    async fn get_system_policies(&self) -> ApiResult<Vec<PolicyInfo>>;

    async fn set_system_policies(&self, policies: &[PolicyInfo]) -> ApiResult<Acknowledgement>;

    async fn list_system_roles(&self) -> ApiResult<Vec<RoleInfo>>;

    async fn list_catalog_roles(&self) -> ApiResult<Vec<RoleInfo>>;

    /// Every item on which `identity` holds a policy
    async fn get_user_policies(&self, identity: &str) -> ApiResult<Vec<UserGroupPolicyItem>>;

    /// Both role scopes, fetched concurrently
    async fn get_all_roles(&self) -> ApiResult<AllRoles> {
        let (system_roles, catalog_roles) =
            futures::try_join!(self.list_system_roles(), self.list_catalog_roles())?;
        Ok(AllRoles {
            system_roles,
            catalog_roles,
        })
    }
}
