//! Error normalization for the reporting server API
//!
//! The server answers with JSON bodies, binary blobs or plain error text. Every
//! failure is folded into [`ApiError`] so callers only ever match on three shapes.

use serde::Deserialize;

/// Result alias used by every API operation
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Non-2xx response. `message` comes from the JSON body when present.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Transport-level failure (unreachable host, TLS, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// Body could not be decoded or had an unexpected content type
    #[error("unexpected response: {0}")]
    Parse(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// Build an HTTP error from a raw error body.
    ///
    /// Prefers the `message` field of a JSON body, then the canonical reason
    /// phrase, then `HTTP <status>`.
    pub fn from_error_body(status: u16, reason: Option<&str>, body: &str) -> Self {
        let from_body = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.trim().is_empty());

        let message = from_body
            .or_else(|| reason.filter(|r| !r.is_empty()).map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {}", status));

        ApiError::Http { status, message }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

/// Error payload the proxy returns alongside non-2xx statuses
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub message: Option<String>,
    pub error_code: Option<String>,
    pub user: Option<String>,
    pub report_path: Option<String>,
    pub timestamp: Option<String>,
}
