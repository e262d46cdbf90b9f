//! OpenAI API client implementation
//!
//! A strongly-typed client for OpenAI-compatible chat completions, used as
//! the `Generator` backend. Structured output is requested with a strict
//! `json_schema` response format and the message content is decoded as JSON.

mod models;
pub use models::*;

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::config::{OpenAIConfig, ServiceConfig, DEFAULT_PROVIDER};
use crate::core::{GenerationRequest, Generator};
use crate::error::{Result, ServiceError, ErrorContext};
use crate::services::common::{UserAgent, build_http_client, parse_error_response, record_request_metrics};
use crate::util::{generate_request_id, sanitize_for_logging, truncate_string};

const CHAT_COMPLETIONS: &str = "chat/completions";

/// OpenAI API client
pub struct OpenAIClient {
    /// HTTP client
    http_client: Client,

    /// Configuration
    config: OpenAIConfig,
}

impl std::fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl OpenAIClient {
    /// Create a new OpenAI client with custom configuration
    pub fn new_with_config(config: OpenAIConfig) -> Result<Self> {
        config.validate()?;

        let http_client = build_http_client(
            Some(UserAgent {
                extra: Some("OpenAI-Client".to_string()),
                ..UserAgent::default()
            }),
            Some(Duration::from_secs(config.timeout_seconds)),
        )?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create a new builder for the OpenAI client
    pub fn builder() -> OpenAIClientBuilder {
        OpenAIClientBuilder::default()
    }

    /// Model used for generation
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Whether an API key is configured
    pub fn is_authenticated(&self) -> bool {
        self.config.has_credentials()
    }

    /// Send a chat completion request
    pub async fn chat_completion(&self, request: ChatCompletionRequest) -> Result<ChatCompletionResponse> {
        self.post(CHAT_COMPLETIONS, &request).await
    }

    /// Run a schema-constrained completion and decode the message content as JSON
    pub async fn structured_completion(&self, request: &GenerationRequest) -> Result<Value> {
        let completion = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(request.system_prompt.clone()),
                ChatMessage::user(request.user_prompt.clone()),
            ],
            response_format: Some(ResponseFormat::json_schema(
                request.schema.name.clone(),
                request.schema.schema.clone(),
            )),
            ..Default::default()
        };

        let response = self.chat_completion(completion).await?;
        extract_json_content(&response)
    }

    /// Authentication headers for a request
    fn auth_headers(&self) -> Result<Vec<(&'static str, String)>> {
        let api_key = self.config.api_key.as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ServiceError::authentication("No API key set for OpenAI client"))?;

        let mut headers = vec![("Authorization", format!("Bearer {}", api_key))];

        if let Some(ref org) = self.config.org_id {
            headers.push(("OpenAI-Organization", org.clone()));
        }

        Ok(headers)
    }

    async fn post<T, R>(&self, endpoint: &str, request: &T) -> Result<R>
    where
        T: Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let url = format!("{}/{}", self.config.base_url, endpoint);
        let request_id = generate_request_id();
        debug!("Sending request to OpenAI: POST {} (request {})", url, request_id);

        let start_time = Instant::now();
        let auth_headers = self.auth_headers()?;

        let request_json = serde_json::to_string(request)
            .map_err(|e| ServiceError::validation(format!("Failed to serialize request: {}", e)))?;

        let bytes_sent = request_json.len() as u64;

        let mut builder = self.http_client.post(&url);

        for (key, value) in &auth_headers {
            builder = builder.header(*key, value);
        }

        let response = builder
            .header("Content-Type", "application/json")
            .body(request_json)
            .send()
            .await
            .map_err(|e| {
                record_request_metrics(false, Some(bytes_sent), None);
                ServiceError::from(e)
                    .with_context(ErrorContext::for_service("openai").endpoint(endpoint).request_id(&request_id))
            })?;

        let status = response.status();

        if status.is_success() {
            let bytes_received = response.content_length();

            let json = response.json::<R>().await
                .map_err(|e| ServiceError::parsing(format!("Failed to parse response: {}", e)))?;

            record_request_metrics(true, Some(bytes_sent), bytes_received);
            debug!(
                "OpenAI responded {} in {:.2}ms (request {})",
                status.as_u16(),
                start_time.elapsed().as_secs_f64() * 1000.0,
                request_id
            );

            Ok(json)
        } else {
            let error = parse_error_response("openai", response).await;
            record_request_metrics(false, Some(bytes_sent), None);
            warn!(
                "OpenAI request {} failed with status {}: {}",
                request_id,
                status.as_u16(),
                sanitize_for_logging(&error.to_string())
            );

            Err(error)
        }
    }
}

/// Pull the JSON object out of the first choice of a completion
fn extract_json_content(response: &ChatCompletionResponse) -> Result<Value> {
    let choice = response.choices.first()
        .ok_or_else(|| ServiceError::parsing("No completion choices returned"))?;

    if let Some(ref refusal) = choice.message.refusal {
        return Err(ServiceError::service(format!("Model refused the request: {}", refusal)));
    }

    let content = choice.message.content.as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ServiceError::parsing("Empty completion response"))?;

    let value: Value = serde_json::from_str(content)
        .map_err(|e| ServiceError::parsing(format!(
            "Completion is not valid JSON ({}): {}",
            e,
            truncate_string(content, 120)
        )))?;

    if !value.is_object() {
        return Err(ServiceError::validation("Completion JSON is not an object"));
    }

    Ok(value)
}

#[async_trait]
impl Generator for OpenAIClient {
    async fn generate(&self, request: GenerationRequest) -> Result<Value> {
        self.structured_completion(&request).await
    }
}

/// Builder for OpenAI client
#[derive(Default)]
pub struct OpenAIClientBuilder {
    /// API key for authentication
    api_key: Option<String>,

    /// Organization ID
    org_id: Option<String>,

    /// Base URL for the API
    base_url: Option<String>,

    /// Model used for generation
    model: Option<String>,

    /// Request timeout
    timeout_seconds: Option<u64>,
}

impl OpenAIClientBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the organization ID
    pub fn org_id(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }

    /// Set the base URL
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the model
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the timeout in seconds
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Build the OpenAI client
    pub fn build(self) -> Result<OpenAIClient> {
        // Environment first, explicit values override
        let mut config = OpenAIConfig::from_provider(&**DEFAULT_PROVIDER).unwrap_or_default();

        if let Some(api_key) = self.api_key {
            config.api_key = Some(api_key);
        }

        if let Some(org_id) = self.org_id {
            config.org_id = Some(org_id);
        }

        if let Some(base_url) = self.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }

        if let Some(model) = self.model {
            config.model = model;
        }

        if let Some(timeout) = self.timeout_seconds {
            config.timeout_seconds = timeout;
        }

        if !config.has_credentials() {
            return Err(ServiceError::validation("API key is required"));
        }

        OpenAIClient::new_with_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response_with(message: Value) -> ChatCompletionResponse {
        serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1,
            "model": "gpt-4o",
            "choices": [{ "index": 0, "message": message, "finish_reason": "stop" }]
        }))
        .unwrap()
    }

    #[test]
    fn test_extract_json_content() {
        let response = response_with(json!({ "role": "assistant", "content": "{\"a\": 1}" }));
        assert_eq!(extract_json_content(&response).unwrap(), json!({ "a": 1 }));
    }

    #[test]
    fn test_extract_rejects_refusal_and_garbage() {
        let refusal = response_with(json!({ "role": "assistant", "content": null, "refusal": "no" }));
        assert!(matches!(extract_json_content(&refusal), Err(ServiceError::Service(_))));

        let empty = response_with(json!({ "role": "assistant", "content": "  " }));
        assert!(matches!(extract_json_content(&empty), Err(ServiceError::Parsing(_))));

        let not_json = response_with(json!({ "role": "assistant", "content": "sure thing" }));
        assert!(matches!(extract_json_content(&not_json), Err(ServiceError::Parsing(_))));

        let array = response_with(json!({ "role": "assistant", "content": "[1, 2]" }));
        assert!(matches!(extract_json_content(&array), Err(ServiceError::Validation(_))));
    }

    #[test]
    fn test_builder_requires_key() {
        let result = OpenAIClient::builder()
            .api_key("")
            .base_url("http://localhost:1")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_response_format_serialization() {
        let format = ResponseFormat::json_schema("search_filter", json!({ "type": "object" }));
        let value = serde_json::to_value(&format).unwrap();

        assert_eq!(value["type"], "json_schema");
        assert_eq!(value["json_schema"]["name"], "search_filter");
        assert_eq!(value["json_schema"]["strict"], true);
    }
}
