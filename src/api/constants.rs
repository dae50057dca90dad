//! Endpoint layout of the reporting server proxy

use super::format::RenderFormat;

/// Default proxy location when no environment is configured
pub const DEFAULT_BASE_URL: &str = "https://localhost:7134/api";

pub const USER_AGENT: &str = "ssrs-cli/0.1";

/// Endpoint groups exposed by the proxy
pub mod groups {
    pub const REPORTS: &str = "Reports";
    pub const MANAGEMENT: &str = "Management";
    pub const SECURITY: &str = "Security";
}

/// Paths relative to their endpoint group
pub mod paths {
    pub const TEST_CONNECTION: &str = "test-connection";
    pub const BROWSE: &str = "browse";
    pub const PARAMETERS: &str = "parameters";
    pub const RENDER: &str = "render";
    pub const USER: &str = "user";
    pub const SEARCH: &str = "search";
    pub const FOLDER: &str = "folder";
    pub const REPORT: &str = "report";
    pub const MOVE: &str = "move";
    pub const POLICIES: &str = "policies";
    pub const SYSTEM_POLICIES: &str = "system-policies";
    pub const USER_POLICIES: &str = "user-policies";
    pub const SYSTEM_ROLES: &str = "roles/system";
    pub const CATALOG_ROLES: &str = "roles/catalog";
}

/// Query string parameter names
pub mod query {
    pub const FOLDER_PATH: &str = "folderPath";
    pub const REPORT_PATH: &str = "reportPath";
    pub const ITEM_PATH: &str = "itemPath";
    pub const QUERY: &str = "query";
    pub const USER_NAME: &str = "userName";
}

pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    pub const X_CORRELATION_ID: &str = "X-Correlation-ID";
}

/// Join base url, group and path into a full endpoint url
pub fn endpoint(base_url: &str, group: &str, path: &str) -> String {
    format!("{}/{}/{}", base_url.trim_end_matches('/'), group, path)
}

/// Endpoint with a single percent-encoded query parameter
pub fn endpoint_with_query(base_url: &str, group: &str, path: &str, key: &str, value: &str) -> String {
    format!("{}?{}={}", endpoint(base_url, group, path), key, urlencoding::encode(value))
}

/// PDF renders through the bare `/render` route, every other format through `/render/{FORMAT}`
pub fn render_endpoint(base_url: &str, format: RenderFormat) -> String {
    match format {
        RenderFormat::Pdf => endpoint(base_url, groups::REPORTS, paths::RENDER),
        other => endpoint(
            base_url,
            groups::REPORTS,
            &format!("{}/{}", paths::RENDER, other.as_str()),
        ),
    }
}
