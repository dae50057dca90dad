//! Structured request logging with correlation tracking
//!
//! Every call to the reporting server gets a correlation id that is sent as
//! `X-Correlation-ID` and repeated in each log event, so a single render or
//! policy save can be followed through the proxy's own logs.

use log::{debug, error, info, warn};
use serde_json::json;
use std::collections::HashMap;
use std::time::{Duration, Instant};

const REDACTED_HEADERS: [&str; 3] = ["authorization", "cookie", "set-cookie"];

/// Structured logger for API calls
#[derive(Debug, Clone)]
pub struct ApiLogger {
    request_logging: bool,
}

/// Context for a single API call
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub correlation_id: String,
    /// Short operation name (browse, render, set-policies, ...)
    pub operation: String,
    /// Item path or query the call targets
    pub target: String,
    pub start_time: Instant,
}

impl Default for ApiLogger {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ApiLogger {
    pub fn new(request_logging: bool) -> Self {
        Self { request_logging }
    }

    /// Start tracking a new call with a fresh correlation id
    pub fn start_operation(&self, operation: &str, target: &str) -> OperationContext {
        let context = OperationContext {
            correlation_id: uuid::Uuid::new_v4().to_string(),
            operation: operation.to_string(),
            target: target.to_string(),
            start_time: Instant::now(),
        };

        if self.request_logging {
            let log_data = json!({
                "event": "operation_started",
                "correlation_id": context.correlation_id,
                "operation": context.operation,
                "target": context.target,
                "timestamp": chrono::Utc::now().to_rfc3339()
            });
            debug!("API Operation Started: {}", log_data);
        }

        context
    }

    pub fn log_request(&self, context: &OperationContext, method: &str, url: &str, headers: &HashMap<String, String>) {
        if !self.request_logging {
            return;
        }

        let log_data = json!({
            "event": "http_request",
            "correlation_id": context.correlation_id,
            "operation": context.operation,
            "method": method,
            "url": url,
            "headers": sanitize_headers(headers),
        });
        debug!("HTTP Request: {}", log_data);
    }

    pub fn log_response(&self, context: &OperationContext, status_code: u16, headers: &HashMap<String, String>) {
        if !self.request_logging {
            return;
        }

        let log_data = json!({
            "event": "http_response",
            "correlation_id": context.correlation_id,
            "operation": context.operation,
            "status_code": status_code,
            "duration_ms": context.start_time.elapsed().as_millis(),
            "headers": sanitize_headers(headers),
        });

        if status_code >= 400 {
            warn!("HTTP Response (Error): {}", log_data);
        } else {
            debug!("HTTP Response: {}", log_data);
        }
    }

    /// Log the outcome of a call
    pub fn complete_operation(&self, context: &OperationContext, error_message: Option<&str>) {
        let duration: Duration = context.start_time.elapsed();
        let log_data = json!({
            "event": "operation_completed",
            "correlation_id": context.correlation_id,
            "operation": context.operation,
            "target": context.target,
            "duration_ms": duration.as_millis(),
            "success": error_message.is_none(),
            "error_message": error_message,
        });

        match error_message {
            None => info!("API Operation Completed: {}", log_data),
            Some(_) => error!("API Operation Failed: {}", log_data),
        }
    }
}

/// Replace credential-bearing header values
pub fn sanitize_headers(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            if REDACTED_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
                (name.clone(), "[REDACTED]".to_string())
            } else {
                (name.clone(), value.clone())
            }
        })
        .collect()
}

/// Flatten reqwest headers into a loggable map
pub fn header_map(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.to_string(), v.to_string())))
        .collect()
}
