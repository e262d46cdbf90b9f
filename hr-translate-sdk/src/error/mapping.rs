//! Error mapping for generation backends
//!
//! Converts error responses from the generative service into the normalized
//! ServiceError type.

use reqwest::StatusCode;
use serde_json::Value;

use super::{ErrorContext, ServiceError};

/// Pick the error variant for an HTTP status code
fn error_for_status(status: StatusCode, message: impl Into<String>) -> ServiceError {
    let message = message.into();
    match status {
        StatusCode::UNAUTHORIZED => ServiceError::authentication(message),
        StatusCode::FORBIDDEN => ServiceError::authorization(message),
        StatusCode::TOO_MANY_REQUESTS => ServiceError::rate_limit(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ServiceError::validation(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ServiceError::timeout(message),
        StatusCode::NOT_FOUND => ServiceError::service(format!("Resource not found: {}", message)),
        _ => ServiceError::service(message),
    }
}

/// Map an OpenAI API error body to a ServiceError
pub fn map_openai_error(
    status: StatusCode,
    json: &Value,
    context: &mut ErrorContext,
) -> ServiceError {
    context.service = "openai".to_string();

    if let Some(error) = json.get("error") {
        if let Some(error_type) = error.get("type").and_then(|t| t.as_str()) {
            context.add("error_type", error_type);
        }

        if let Some(code) = error.get("code").and_then(|c| c.as_str()) {
            context.error_code = Some(code.to_string());
        }

        let message = error.get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown OpenAI error");

        return error_for_status(status, message);
    }

    let message = json.get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown error");

    error_for_status(status, message)
}

/// Map a raw HTTP error response to a ServiceError
pub fn map_http_error(
    status: StatusCode,
    body: &str,
    context: &mut ErrorContext,
) -> ServiceError {
    if let Ok(json) = serde_json::from_str::<Value>(body) {
        if context.service == "openai" {
            return map_openai_error(status, &json, context);
        }

        let message = json.get("message")
            .or_else(|| json.get("error"))
            .and_then(|m| m.as_str())
            .unwrap_or(body);

        return error_for_status(status, message);
    }

    let message = if body.is_empty() {
        status.to_string()
    } else if body.len() > 100 {
        format!("{}: {}", status, crate::util::truncate_string(body, 100))
    } else {
        format!("{}: {}", status, body)
    };

    error_for_status(status, message)
}
