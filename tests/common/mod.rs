//! Scripted in-memory report server for driving the state containers

#![allow(dead_code)]

use async_trait::async_trait;
use ssrs_cli::api::{
    Acknowledgement, ApiError, ApiResult, BrowseResponse, CreateFolderRequest, CreateReportRequest, FolderItem,
    MoveItemRequest, ParameterType, PolicyInfo, RenderFormat, RenderRequest, RenderedReport, ReportItem,
    ReportParameter, ReportServerApi, RoleInfo, SearchResult, TestConnectionResponse, UserGroupPolicyItem, UserInfo,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

const STAMP: &str = "2024-01-02T10:00:00";

#[derive(Default)]
pub struct FakeReportServer {
    folders: Mutex<HashMap<String, BrowseResponse>>,
    parameters: Mutex<HashMap<String, Vec<ReportParameter>>>,
    policies: Mutex<HashMap<String, Vec<PolicyInfo>>>,
    system_policies: Mutex<Vec<PolicyInfo>>,
    catalog_roles: Vec<RoleInfo>,
    system_roles: Vec<RoleInfo>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    failures: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
    renders: Mutex<Vec<(RenderRequest, RenderFormat)>>,
    uploads: Mutex<Vec<CreateReportRequest>>,
}

pub fn folder(path: &str) -> FolderItem {
    FolderItem {
        name: path.rsplit('/').next().unwrap_or_default().to_string(),
        path: path.to_string(),
        created_date: STAMP.to_string(),
        modified_date: STAMP.to_string(),
        description: None,
    }
}

pub fn report(path: &str) -> ReportItem {
    ReportItem {
        name: path.rsplit('/').next().unwrap_or_default().to_string(),
        path: path.to_string(),
        item_type: "Report".to_string(),
        created_date: STAMP.to_string(),
        modified_date: STAMP.to_string(),
        description: None,
    }
}

pub fn parameter(name: &str, parameter_type: ParameterType, nullable: bool, default: Option<&str>) -> ReportParameter {
    ReportParameter {
        name: name.to_string(),
        parameter_type,
        nullable,
        allow_blank: false,
        multi_value: false,
        valid_values: Vec::new(),
        default_value: default.map(str::to_string),
        prompt: name.to_string(),
    }
}

fn role(name: &str) -> RoleInfo {
    RoleInfo {
        name: name.to_string(),
        description: format!("{} role", name),
    }
}

impl FakeReportServer {
    pub fn new() -> Self {
        Self {
            catalog_roles: ["Browser", "Content Manager", "Publisher", "Report Builder"]
                .into_iter()
                .map(role)
                .collect(),
            system_roles: ["System Administrator", "System User"].into_iter().map(role).collect(),
            ..Self::default()
        }
    }

    /// `/` holds `Sales`; `/Sales` holds `Q1`, `Q2` and the `Revenue` report
    pub fn sales_catalog() -> Self {
        let server = Self::new();
        server.add_folder("/", &["/Sales"], &[]);
        server.add_folder("/Sales", &["/Sales/Q1", "/Sales/Q2"], &["/Sales/Revenue"]);
        server.add_folder("/Sales/Q1", &[], &[]);
        server.add_folder("/Sales/Q2", &[], &[]);
        server.set_parameters(
            "/Sales/Revenue",
            vec![parameter("Region", ParameterType::String, false, None)],
        );
        server
    }

    pub fn add_folder(&self, path: &str, folders: &[&str], reports: &[&str]) {
        self.folders.lock().unwrap().insert(
            path.to_string(),
            BrowseResponse {
                current_path: path.to_string(),
                folders: folders.iter().map(|f| folder(f)).collect(),
                reports: reports.iter().map(|r| report(r)).collect(),
            },
        );
    }

    pub fn set_parameters(&self, report_path: &str, parameters: Vec<ReportParameter>) {
        self.parameters
            .lock()
            .unwrap()
            .insert(report_path.to_string(), parameters);
    }

    pub fn set_item_policies(&self, item_path: &str, policies: Vec<PolicyInfo>) {
        self.policies.lock().unwrap().insert(item_path.to_string(), policies);
    }

    /// Hold the next call for `key` (e.g. `browse:/Sales`) until a permit is added
    pub fn hold(&self, key: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().insert(key.to_string(), gate.clone());
        gate
    }

    /// Make the call identified by `key` answer with HTTP 500
    pub fn fail(&self, key: &str) {
        self.failures.lock().unwrap().insert(key.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn was_called(&self, key: &str) -> bool {
        self.calls().iter().any(|c| c == key)
    }

    pub fn renders(&self) -> Vec<(RenderRequest, RenderFormat)> {
        self.renders.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<CreateReportRequest> {
        self.uploads.lock().unwrap().clone()
    }

    async fn enter(&self, key: String) -> ApiResult<()> {
        self.calls.lock().unwrap().push(key.clone());

        let gate = self.gates.lock().unwrap().remove(&key);
        if let Some(gate) = gate {
            let permit = gate.acquire().await.map_err(|e| ApiError::Network(e.to_string()))?;
            permit.forget();
        }

        if self.failures.lock().unwrap().contains(&key) {
            return Err(ApiError::Http {
                status: 500,
                message: format!("{} failed", key),
            });
        }
        Ok(())
    }

    fn not_found(what: &str) -> ApiError {
        ApiError::Http {
            status: 404,
            message: format!("{} not found", what),
        }
    }
}

#[async_trait]
impl ReportServerApi for FakeReportServer {
    async fn test_connection(&self) -> ApiResult<TestConnectionResponse> {
        self.enter("test-connection".to_string()).await?;
        let folders = self.folders.lock().unwrap();
        let report_count = folders.values().map(|f| f.reports.len() as u64).sum();
        Ok(TestConnectionResponse {
            message: "Connection successful".to_string(),
            user: "CONTOSO\\report.admin".to_string(),
            report_count,
            folder_count: folders.len() as u64,
            reports: Vec::new(),
            timestamp: STAMP.to_string(),
        })
    }

    async fn current_user(&self) -> ApiResult<UserInfo> {
        self.enter("user".to_string()).await?;
        Ok(UserInfo {
            is_authenticated: true,
            name: "CONTOSO\\report.admin".to_string(),
            authentication_type: "Negotiate".to_string(),
            is_windows_identity: true,
        })
    }

    async fn browse_folder(&self, folder_path: &str) -> ApiResult<BrowseResponse> {
        self.enter(format!("browse:{}", folder_path)).await?;
        self.folders
            .lock()
            .unwrap()
            .get(folder_path)
            .cloned()
            .ok_or_else(|| Self::not_found(folder_path))
    }

    async fn get_report_parameters(&self, report_path: &str) -> ApiResult<Vec<ReportParameter>> {
        self.enter(format!("parameters:{}", report_path)).await?;
        self.parameters
            .lock()
            .unwrap()
            .get(report_path)
            .cloned()
            .ok_or_else(|| Self::not_found(report_path))
    }

    async fn render_report(&self, request: &RenderRequest, format: RenderFormat) -> ApiResult<RenderedReport> {
        self.enter(format!("render:{}:{}", format.as_str(), request.report_path))
            .await?;
        self.renders.lock().unwrap().push((request.clone(), format));
        Ok(RenderedReport {
            format,
            content_type: Some(format.mime_type().to_string()),
            bytes: format!("{} {}", format.as_str(), request.report_path).into_bytes(),
        })
    }

    async fn search_reports(&self, query: &str) -> ApiResult<Vec<SearchResult>> {
        self.enter(format!("search:{}", query)).await?;
        let needle = query.to_lowercase();
        let folders = self.folders.lock().unwrap();
        let mut results: Vec<SearchResult> = folders
            .values()
            .flat_map(|f| f.reports.iter())
            .filter(|r| r.name.to_lowercase().contains(&needle))
            .map(|r| SearchResult {
                item_type: ssrs_cli::api::ItemType::Report,
                name: r.name.clone(),
                path: r.path.clone(),
                description: None,
                created_date: r.created_date.clone(),
                modified_date: r.modified_date.clone(),
            })
            .collect();
        results.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(results)
    }

    async fn create_folder(&self, request: &CreateFolderRequest) -> ApiResult<Acknowledgement> {
        let path = if request.parent_path == "/" {
            format!("/{}", request.folder_name)
        } else {
            format!("{}/{}", request.parent_path, request.folder_name)
        };
        self.enter(format!("create-folder:{}", path)).await?;

        let mut folders = self.folders.lock().unwrap();
        if let Some(parent) = folders.get_mut(&request.parent_path) {
            parent.folders.push(folder(&path));
        }
        folders.insert(
            path.clone(),
            BrowseResponse {
                current_path: path,
                folders: Vec::new(),
                reports: Vec::new(),
            },
        );
        Ok(Acknowledgement::new("Folder created successfully"))
    }

    async fn delete_folder(&self, folder_path: &str) -> ApiResult<Acknowledgement> {
        self.enter(format!("delete-folder:{}", folder_path)).await?;
        let mut folders = self.folders.lock().unwrap();
        folders
            .remove(folder_path)
            .ok_or_else(|| Self::not_found(folder_path))?;
        for listing in folders.values_mut() {
            listing.folders.retain(|f| f.path != folder_path);
        }
        Ok(Acknowledgement::new("Folder deleted successfully"))
    }

    async fn create_report(&self, request: &CreateReportRequest) -> ApiResult<Acknowledgement> {
        self.enter(format!("create-report:{}/{}", request.parent_path, request.report_name))
            .await?;
        self.uploads.lock().unwrap().push(request.clone());
        Ok(Acknowledgement::new("Report created successfully"))
    }

    async fn delete_report(&self, report_path: &str) -> ApiResult<Acknowledgement> {
        self.enter(format!("delete-report:{}", report_path)).await?;
        let mut folders = self.folders.lock().unwrap();
        let mut found = false;
        for listing in folders.values_mut() {
            let before = listing.reports.len();
            listing.reports.retain(|r| r.path != report_path);
            found |= before != listing.reports.len();
        }
        if !found {
            return Err(Self::not_found(report_path));
        }
        Ok(Acknowledgement::new("Report deleted successfully"))
    }

    async fn move_item(&self, request: &MoveItemRequest) -> ApiResult<Acknowledgement> {
        self.enter(format!("move:{}->{}", request.item_path, request.target_path))
            .await?;
        let mut folders = self.folders.lock().unwrap();
        let mut moved = None;
        for listing in folders.values_mut() {
            if let Some(idx) = listing.reports.iter().position(|r| r.path == request.item_path) {
                moved = Some(listing.reports.remove(idx));
            }
        }
        let mut item = moved.ok_or_else(|| Self::not_found(&request.item_path))?;
        let target = folders
            .get_mut(&request.target_path)
            .ok_or_else(|| Self::not_found(&request.target_path))?;
        item.path = format!("{}/{}", request.target_path.trim_end_matches('/'), item.name);
        target.reports.push(item);
        Ok(Acknowledgement::new("Item moved successfully"))
    }

    async fn get_policies(&self, item_path: &str) -> ApiResult<Vec<PolicyInfo>> {
        self.enter(format!("get-policies:{}", item_path)).await?;
        Ok(self
            .policies
            .lock()
            .unwrap()
            .get(item_path)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_policies(&self, item_path: &str, policies: &[PolicyInfo]) -> ApiResult<Acknowledgement> {
        self.enter(format!("set-policies:{}", item_path)).await?;
        self.policies
            .lock()
            .unwrap()
            .insert(item_path.to_string(), policies.to_vec());
        Ok(Acknowledgement::new("Policies updated successfully"))
    }

    async fn get_system_policies(&self) -> ApiResult<Vec<PolicyInfo>> {
        self.enter("get-system-policies".to_string()).await?;
        Ok(self.system_policies.lock().unwrap().clone())
    }

    async fn set_system_policies(&self, policies: &[PolicyInfo]) -> ApiResult<Acknowledgement> {
        self.enter("set-system-policies".to_string()).await?;
        *self.system_policies.lock().unwrap() = policies.to_vec();
        Ok(Acknowledgement::new("System policies updated successfully"))
    }

    async fn list_system_roles(&self) -> ApiResult<Vec<RoleInfo>> {
        self.enter("roles:system".to_string()).await?;
        Ok(self.system_roles.clone())
    }

    async fn list_catalog_roles(&self) -> ApiResult<Vec<RoleInfo>> {
        self.enter("roles:catalog".to_string()).await?;
        Ok(self.catalog_roles.clone())
    }

    async fn get_user_policies(&self, identity: &str) -> ApiResult<Vec<UserGroupPolicyItem>> {
        self.enter(format!("user-policies:{}", identity)).await?;
        let policies = self.policies.lock().unwrap();
        let mut items: Vec<UserGroupPolicyItem> = policies
            .iter()
            .filter_map(|(path, list)| {
                let policy = list.iter().find(|p| p.group_user_name == identity)?;
                Some(UserGroupPolicyItem {
                    item_path: path.clone(),
                    item_name: path.rsplit('/').next().unwrap_or_default().to_string(),
                    item_type: ssrs_cli::api::ItemType::Folder,
                    roles: policy.roles.clone(),
                })
            })
            .collect();
        items.sort_by(|a, b| a.item_path.cmp(&b.item_path));
        Ok(items)
    }
}
