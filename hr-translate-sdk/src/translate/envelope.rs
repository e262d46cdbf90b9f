//! Result envelope returned by every translator

use serde::{Deserialize, Serialize};

/// Reason reported when a model call was attempted and failed
pub const FALLBACK_REASON: &str = "OpenAI service unavailable";

/// Outcome of one translation.
///
/// `success` is always true: failures degrade to the heuristic path instead
/// of surfacing. `fallback_reason` is set only when the model path was
/// attempted (or configured) and failed; a fallback caused by missing
/// credentials carries no reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope<T> {
    pub success: bool,
    pub payload: T,
    pub using_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
}

impl<T> ResultEnvelope<T> {
    /// Payload produced by the model
    pub fn from_model(payload: T) -> Self {
        Self {
            success: true,
            payload,
            using_fallback: false,
            fallback_reason: None,
        }
    }

    /// Heuristic payload used because no credentials are configured
    pub fn unconfigured(payload: T) -> Self {
        Self {
            success: true,
            payload,
            using_fallback: true,
            fallback_reason: None,
        }
    }

    /// Heuristic payload used because the model path failed
    pub fn degraded(payload: T) -> Self {
        Self {
            success: true,
            payload,
            using_fallback: true,
            fallback_reason: Some(FALLBACK_REASON.to_string()),
        }
    }

    /// Transform the payload, keeping the fallback markers
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResultEnvelope<U> {
        ResultEnvelope {
            success: self.success,
            payload: f(self.payload),
            using_fallback: self.using_fallback,
            fallback_reason: self.fallback_reason,
        }
    }
}
