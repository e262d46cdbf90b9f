//! Common utilities for generation backends
//!
//! HTTP client construction, error response parsing and process-wide request
//! counters.

use std::fmt;
use std::time::Duration;
use std::sync::atomic::{AtomicU64, Ordering};
use std::collections::HashMap;
use reqwest::{header, Client};
use once_cell::sync::Lazy;

use crate::error::{Result, ServiceError, ErrorContext};

/// UserAgent structure for identifying the client to upstream services
#[derive(Debug, Clone)]
pub struct UserAgent {
    /// Application name
    pub app_name: String,

    /// Version string
    pub version: String,

    /// Optional extra info
    pub extra: Option<String>,
}

impl Default for UserAgent {
    fn default() -> Self {
        Self {
            app_name: "HR-Bulk-Edit".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            extra: Some("hr-translate-sdk".to_string()),
        }
    }
}

impl fmt::Display for UserAgent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.app_name, self.version)?;

        if let Some(ref extra) = self.extra {
            write!(f, " ({})", extra)?;
        }

        Ok(())
    }
}

/// Process-wide request counters
#[derive(Debug, Default)]
struct ClientMetrics {
    request_count: AtomicU64,
    success_count: AtomicU64,
    error_count: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
}

impl ClientMetrics {
    fn as_map(&self) -> HashMap<String, u64> {
        let mut map = HashMap::new();

        map.insert("request_count".to_string(), self.request_count.load(Ordering::Relaxed));
        map.insert("success_count".to_string(), self.success_count.load(Ordering::Relaxed));
        map.insert("error_count".to_string(), self.error_count.load(Ordering::Relaxed));
        map.insert("bytes_sent".to_string(), self.bytes_sent.load(Ordering::Relaxed));
        map.insert("bytes_received".to_string(), self.bytes_received.load(Ordering::Relaxed));

        map
    }
}

static GLOBAL_METRICS: Lazy<ClientMetrics> = Lazy::new(ClientMetrics::default);

/// Build a standard HTTP client with default settings
pub fn build_http_client(
    user_agent: Option<UserAgent>,
    timeout: Option<Duration>,
) -> Result<Client> {
    let mut headers = header::HeaderMap::new();
    let ua = user_agent.unwrap_or_default().to_string();

    headers.insert(
        header::USER_AGENT,
        header::HeaderValue::from_str(&ua).map_err(|e| {
            ServiceError::configuration(format!("Invalid user agent: {}", e))
        })?,
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout.unwrap_or_else(|| Duration::from_secs(30)))
        .gzip(true)
        .build()
        .map_err(|e| {
            ServiceError::configuration(format!("Failed to build HTTP client: {}", e))
        })
}

/// Create error context for HTTP requests
pub fn create_error_context(
    service_name: &str,
    status: Option<reqwest::StatusCode>,
) -> ErrorContext {
    let mut context = ErrorContext::for_service(service_name);

    if let Some(status_code) = status {
        context = context.status_code(status_code.as_u16());
    }

    context
}

/// Parse error response from HTTP response
pub async fn parse_error_response(
    service_name: &str,
    response: reqwest::Response,
) -> ServiceError {
    let status = response.status();
    let mut context = create_error_context(service_name, Some(status));

    let body = match response.text().await {
        Ok(body) => body,
        Err(e) => format!("Failed to read error response: {}", e),
    };

    crate::error::mapping::map_http_error(status, &body, &mut context)
        .with_context(context)
}

/// Record the outcome of one outbound request
pub fn record_request_metrics(
    is_success: bool,
    bytes_sent: Option<u64>,
    bytes_received: Option<u64>,
) {
    GLOBAL_METRICS.request_count.fetch_add(1, Ordering::Relaxed);

    if is_success {
        GLOBAL_METRICS.success_count.fetch_add(1, Ordering::Relaxed);
    } else {
        GLOBAL_METRICS.error_count.fetch_add(1, Ordering::Relaxed);
    }

    if let Some(bytes) = bytes_sent {
        GLOBAL_METRICS.bytes_sent.fetch_add(bytes, Ordering::Relaxed);
    }

    if let Some(bytes) = bytes_received {
        GLOBAL_METRICS.bytes_received.fetch_add(bytes, Ordering::Relaxed);
    }
}

/// Snapshot of the process-wide request counters
pub fn get_global_metrics() -> HashMap<String, u64> {
    GLOBAL_METRICS.as_map()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_display() {
        let ua = UserAgent {
            app_name: "App".to_string(),
            version: "1.2.3".to_string(),
            extra: None,
        };
        assert_eq!(ua.to_string(), "App/1.2.3");
        assert!(UserAgent::default().to_string().contains("(hr-translate-sdk)"));
    }

    #[test]
    fn test_metrics_are_monotonic() {
        let before = get_global_metrics();
        record_request_metrics(false, Some(10), None);
        let after = get_global_metrics();

        assert!(after["request_count"] > before["request_count"]);
        assert!(after["error_count"] > before["error_count"]);
        assert!(after["bytes_sent"] >= before["bytes_sent"] + 10);
    }
}
