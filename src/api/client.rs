use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, WWW_AUTHENTICATE};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use super::constants::{self, groups, headers, paths, query};
use super::error::{ApiError, ApiResult};
use super::format::RenderFormat;
use super::logging::{ApiLogger, OperationContext, header_map};
use super::models::{
    Acknowledgement, BrowseResponse, CreateFolderRequest, CreateReportRequest, MoveItemRequest,
    PolicyInfo, RenderRequest, RenderedReport, ReportParameter, RoleInfo, SearchResult,
    SetPoliciesRequest, TestConnectionResponse, UserGroupPolicyItem, UserInfo,
};
use super::service::ReportServerApi;

/// Credentials sent as HTTP basic auth on every request
#[derive(Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Connection settings resolved from the active environment
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub credentials: Option<BasicCredentials>,
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
    pub request_logging: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            credentials: None,
            accept_invalid_certs: false,
            timeout: Duration::from_secs(60),
            request_logging: true,
        }
    }
}

/// HTTP client for the reporting server proxy with a session cookie store
#[derive(Clone)]
pub struct ReportServerClient {
    base_url: String,
    http_client: reqwest::Client,
    credentials: Option<BasicCredentials>,
    api_logger: ApiLogger,
}

impl ReportServerClient {
    pub fn new(settings: ClientSettings) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .cookie_store(true)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(settings.timeout)
            .connect_timeout(Duration::from_secs(10))
            .danger_accept_invalid_certs(settings.accept_invalid_certs)
            .user_agent(constants::USER_AGENT)
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_custom_client(settings, http_client))
    }

    /// Create a client around an already configured `reqwest::Client`
    pub fn with_custom_client(settings: ClientSettings, http_client: reqwest::Client) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            http_client,
            credentials: settings.credentials,
            api_logger: ApiLogger::new(settings.request_logging),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, group: &str, path: &str) -> String {
        constants::endpoint(&self.base_url, group, path)
    }

    fn url_with_query(&self, group: &str, path: &str, key: &str, value: &str) -> String {
        constants::endpoint_with_query(&self.base_url, group, path, key, value)
    }

    /// Send a request and turn any non-2xx status into [`ApiError::Http`]
    async fn send(
        &self,
        context: &OperationContext,
        method: Method,
        url: &str,
        accept: &str,
        body: Option<Value>,
    ) -> ApiResult<reqwest::Response> {
        let mut request_headers = HashMap::new();
        request_headers.insert(ACCEPT.to_string(), accept.to_string());
        request_headers.insert(headers::X_CORRELATION_ID.to_string(), context.correlation_id.clone());
        self.api_logger
            .log_request(context, method.as_str(), url, &request_headers);

        let mut builder = self
            .http_client
            .request(method, url)
            .header(ACCEPT, accept)
            .header(headers::X_CORRELATION_ID, &context.correlation_id);

        if let Some(credentials) = &self.credentials {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }

        if let Some(body) = body {
            builder = builder.json(&body);
        }

        let response = builder.send().await?;
        self.api_logger
            .log_response(context, response.status().as_u16(), &header_map(response.headers()));

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn error_from_response(response: reqwest::Response) -> ApiError {
        let status = response.status();
        // Pass authentication challenges through so the caller can see which scheme is wanted
        let challenge = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();

        let mut error = ApiError::from_error_body(status.as_u16(), status.canonical_reason(), &body);
        if let (Some(challenge), ApiError::Http { message, .. }) = (challenge, &mut error) {
            message.push_str(&format!(" (WWW-Authenticate: {})", challenge));
        }
        error
    }

    async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
        let content_type = content_type_of(&response);
        if let Some(content_type) = &content_type {
            if !content_type.contains("json") {
                return Err(ApiError::Parse(format!(
                    "expected JSON but server sent '{}'",
                    content_type
                )));
            }
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Management endpoints answer with JSON, plain text or nothing at all
    async fn decode_acknowledgement(response: reqwest::Response) -> ApiResult<Acknowledgement> {
        let is_json = content_type_of(&response)
            .map(|ct| ct.contains("json"))
            .unwrap_or(false);
        let text = response.text().await?;

        if text.trim().is_empty() {
            return Ok(Acknowledgement::new("OK"));
        }

        if is_json {
            let value: Value = serde_json::from_str(&text)?;
            let message = match &value {
                Value::Object(map) => map
                    .get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string()),
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Ok(Acknowledgement::new(message));
        }

        Ok(Acknowledgement::new(text.trim()))
    }

    fn finish<T>(&self, context: &OperationContext, result: ApiResult<T>) -> ApiResult<T> {
        let error = result.as_ref().err().map(|e| e.to_string());
        self.api_logger.complete_operation(context, error.as_deref());
        result
    }

    async fn get_json<T: DeserializeOwned>(&self, operation: &str, target: &str, url: String) -> ApiResult<T> {
        let context = self.api_logger.start_operation(operation, target);
        let result: ApiResult<T> = async {
            let response = self
                .send(&context, Method::GET, &url, headers::CONTENT_TYPE_JSON, None)
                .await?;
            Self::decode_json(response).await
        }
        .await;
        self.finish(&context, result)
    }

    async fn send_for_ack<B: Serialize + ?Sized>(
        &self,
        operation: &str,
        target: &str,
        method: Method,
        url: String,
        body: Option<&B>,
    ) -> ApiResult<Acknowledgement> {
        let context = self.api_logger.start_operation(operation, target);
        let result: ApiResult<Acknowledgement> = async {
            let body = body.map(serde_json::to_value).transpose()?;
            let response = self
                .send(&context, method, &url, headers::CONTENT_TYPE_JSON, body)
                .await?;
            Self::decode_acknowledgement(response).await
        }
        .await;
        self.finish(&context, result)
    }
}

fn content_type_of(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_ascii_lowercase())
}

#[async_trait]
impl ReportServerApi for ReportServerClient {
    async fn test_connection(&self) -> ApiResult<TestConnectionResponse> {
        let url = self.url(groups::REPORTS, paths::TEST_CONNECTION);
        self.get_json("test-connection", &self.base_url, url).await
    }

    async fn current_user(&self) -> ApiResult<UserInfo> {
        let url = self.url(groups::REPORTS, paths::USER);
        self.get_json("user", "", url).await
    }

    async fn browse_folder(&self, folder_path: &str) -> ApiResult<BrowseResponse> {
        let folder_path = if folder_path.trim().is_empty() { "/" } else { folder_path };
        let url = self.url_with_query(groups::REPORTS, paths::BROWSE, query::FOLDER_PATH, folder_path);
        self.get_json("browse", folder_path, url).await
    }

    async fn get_report_parameters(&self, report_path: &str) -> ApiResult<Vec<ReportParameter>> {
        let url = self.url_with_query(groups::REPORTS, paths::PARAMETERS, query::REPORT_PATH, report_path);
        self.get_json("parameters", report_path, url).await
    }

    async fn render_report(&self, request: &RenderRequest, format: RenderFormat) -> ApiResult<RenderedReport> {
        let context = self
            .api_logger
            .start_operation(&format!("render-{}", format.as_str().to_ascii_lowercase()), &request.report_path);
        let url = constants::render_endpoint(&self.base_url, format);

        let result: ApiResult<RenderedReport> = async {
            let body = serde_json::to_value(request)?;
            let response = self
                .send(&context, Method::POST, &url, format.mime_type(), Some(body))
                .await?;
            let content_type = content_type_of(&response);
            let bytes = response.bytes().await?.to_vec();
            Ok(RenderedReport {
                format,
                content_type,
                bytes,
            })
        }
        .await;
        self.finish(&context, result)
    }

    async fn search_reports(&self, search: &str) -> ApiResult<Vec<SearchResult>> {
        let url = self.url_with_query(groups::REPORTS, paths::SEARCH, query::QUERY, search);
        self.get_json("search", search, url).await
    }

    async fn create_folder(&self, request: &CreateFolderRequest) -> ApiResult<Acknowledgement> {
        let url = self.url(groups::MANAGEMENT, paths::FOLDER);
        self.send_for_ack("create-folder", &request.parent_path, Method::POST, url, Some(request))
            .await
    }

    async fn delete_folder(&self, folder_path: &str) -> ApiResult<Acknowledgement> {
        let url = self.url_with_query(groups::MANAGEMENT, paths::FOLDER, query::FOLDER_PATH, folder_path);
        self.send_for_ack::<Value>("delete-folder", folder_path, Method::DELETE, url, None)
            .await
    }

    async fn create_report(&self, request: &CreateReportRequest) -> ApiResult<Acknowledgement> {
        let url = self.url(groups::MANAGEMENT, paths::REPORT);
        self.send_for_ack("create-report", &request.parent_path, Method::POST, url, Some(request))
            .await
    }

    async fn delete_report(&self, report_path: &str) -> ApiResult<Acknowledgement> {
        let url = self.url_with_query(groups::MANAGEMENT, paths::REPORT, query::REPORT_PATH, report_path);
        self.send_for_ack::<Value>("delete-report", report_path, Method::DELETE, url, None)
            .await
    }

    async fn move_item(&self, request: &MoveItemRequest) -> ApiResult<Acknowledgement> {
        let url = self.url(groups::MANAGEMENT, paths::MOVE);
        self.send_for_ack("move", &request.item_path, Method::POST, url, Some(request))
            .await
    }

    async fn get_policies(&self, item_path: &str) -> ApiResult<Vec<PolicyInfo>> {
        let url = self.url_with_query(groups::SECURITY, paths::POLICIES, query::ITEM_PATH, item_path);
        self.get_json("get-policies", item_path, url).await
    }

    async fn set_policies(&self, item_path: &str, policies: &[PolicyInfo]) -> ApiResult<Acknowledgement> {
        let url = self.url(groups::SECURITY, paths::POLICIES);
        let request = SetPoliciesRequest {
            item_path: item_path.to_string(),
            policies: policies.to_vec(),
        };
        self.send_for_ack("set-policies", item_path, Method::POST, url, Some(&request))
            .await
    }

    async fn get_system_policies(&self) -> ApiResult<Vec<PolicyInfo>> {
        let url = self.url(groups::SECURITY, paths::SYSTEM_POLICIES);
        self.get_json("get-system-policies", "system", url).await
    }

    async fn set_system_policies(&self, policies: &[PolicyInfo]) -> ApiResult<Acknowledgement> {
        let url = self.url(groups::SECURITY, paths::SYSTEM_POLICIES);
        self.send_for_ack("set-system-policies", "system", Method::POST, url, Some(policies))
            .await
    }

    async fn list_system_roles(&self) -> ApiResult<Vec<RoleInfo>> {
        let url = self.url(groups::SECURITY, paths::SYSTEM_ROLES);
        self.get_json("system-roles", "system", url).await
    }

    async fn list_catalog_roles(&self) -> ApiResult<Vec<RoleInfo>> {
        let url = self.url(groups::SECURITY, paths::CATALOG_ROLES);
        self.get_json("catalog-roles", "catalog", url).await
    }

    async fn get_user_policies(&self, identity: &str) -> ApiResult<Vec<UserGroupPolicyItem>> {
        let url = self.url_with_query(groups::SECURITY, paths::USER_POLICIES, query::USER_NAME, identity);
        self.get_json("user-policies", identity, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = ReportServerClient::new(ClientSettings {
            base_url: "https://reports.local/api/".to_string(),
            ..ClientSettings::default()
        })
        .unwrap();

        assert_eq!(client.base_url(), "https://reports.local/api");
        assert_eq!(
            client.url(groups::SECURITY, paths::CATALOG_ROLES),
            "https://reports.local/api/Security/roles/catalog"
        );
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let credentials = BasicCredentials {
            username: "CONTOSO\\svc".to_string(),
            password: "hunter2".to_string(),
        };
        let printed = format!("{:?}", credentials);
        assert!(printed.contains("CONTOSO"));
        assert!(!printed.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let client = ReportServerClient::new(ClientSettings {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
            request_logging: false,
            ..ClientSettings::default()
        })
        .unwrap();

        let err = client.test_connection().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)), "got {:?}", err);
    }
}
