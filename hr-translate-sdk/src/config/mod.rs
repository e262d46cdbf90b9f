//! Configuration management for the translators
//!
//! This module provides utilities for loading and validating configuration,
//! with support for environment variables. The generative-service access
//! token is the only value that changes behavior at runtime: when it is
//! absent the translators never attempt a model call.

use std::env;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use once_cell::sync::Lazy;

use crate::error::{Result, ServiceError};

/// Default OpenAI-compatible endpoint
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model used for schema-constrained generation
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Year the query prompt presents to the model as "current"
pub const DEFAULT_REFERENCE_YEAR: i32 = 2024;

/// Base trait for configuration providers
pub trait ConfigProvider: Send + Sync {
    /// Get a string configuration value
    fn get_string(&self, key: &str) -> Result<String>;
}

/// Extension methods for configuration providers
pub trait ConfigProviderExt: ConfigProvider {
    /// Get an integer configuration value
    fn get_int(&self, key: &str) -> Result<i64> {
        let value = self.get_string(key)?;
        value.trim().parse::<i64>()
            .map_err(|e| ServiceError::configuration(format!("Invalid integer for key {}: {}", key, e)))
    }

    /// Get a boolean configuration value
    fn get_bool(&self, key: &str) -> Result<bool> {
        let value = self.get_string(key)?;
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Ok(true),
            "false" | "no" | "0" | "off" => Ok(false),
            _ => Err(ServiceError::configuration(format!("Invalid boolean value for key {}: {}", key, value))),
        }
    }

    /// Get a non-empty string value; empty and missing values are both `None`
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get_string(key)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Get a string configuration value with a default
    fn get_string_or(&self, key: &str, default: &str) -> String {
        self.get_non_empty(key).unwrap_or_else(|| default.to_string())
    }

    /// Get an integer configuration value with a default
    fn get_int_or(&self, key: &str, default: i64) -> i64 {
        self.get_int(key).unwrap_or(default)
    }

    /// Get a boolean configuration value with a default
    fn get_bool_or(&self, key: &str, default: bool) -> bool {
        self.get_bool(key).unwrap_or(default)
    }
}

impl<T: ConfigProvider + ?Sized> ConfigProviderExt for T {}

/// Environment variable based configuration provider
#[derive(Debug, Clone, Default)]
pub struct EnvConfigProvider {
    /// Optional prefix for environment variables
    prefix: Option<String>,

    /// Optional namespace for variables (e.g., "OPENAI")
    namespace: Option<String>,
}

impl EnvConfigProvider {
    /// Create a new environment variable config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a prefix for environment variables
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set a namespace for environment variables
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Format a configuration key as an environment variable
    fn format_key(&self, key: &str) -> String {
        let mut env_key = String::new();

        if let Some(ref prefix) = self.prefix {
            env_key.push_str(prefix);
            env_key.push('_');
        }

        if let Some(ref namespace) = self.namespace {
            env_key.push_str(namespace);
            env_key.push('_');
        }

        // uppercase, non-alphanumerics become underscores
        env_key.push_str(&key.to_uppercase().replace(|c: char| !c.is_ascii_alphanumeric(), "_"));

        env_key
    }
}

impl ConfigProvider for EnvConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        let env_key = self.format_key(key);

        env::var(&env_key)
            .map_err(|e| {
                match e {
                    env::VarError::NotPresent => {
                        ServiceError::configuration(format!("Environment variable not set: {}", env_key))
                    }
                    env::VarError::NotUnicode(_) => {
                        ServiceError::configuration(format!("Environment variable is not valid unicode: {}", env_key))
                    }
                }
            })
    }
}

/// In-memory config provider for testing or static configuration
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigProvider {
    /// Configuration values
    values: HashMap<String, String>,
}

impl MemoryConfigProvider {
    /// Create a new empty memory config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory config provider with initial values
    pub fn with_values(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Set a configuration value
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: ToString,
    {
        self.values.insert(key.into(), value.to_string());
    }
}

impl ConfigProvider for MemoryConfigProvider {
    fn get_string(&self, key: &str) -> Result<String> {
        self.values
            .get(key)
            .cloned()
            .ok_or_else(|| ServiceError::configuration(format!("Configuration key not found: {}", key)))
    }
}

/// A composite config provider that tries multiple providers in order
#[derive(Debug, Clone)]
pub struct CompositeConfigProvider<P: ConfigProvider> {
    /// Ordered list of config providers to try
    providers: Vec<P>,
}

impl<P: ConfigProvider> Default for CompositeConfigProvider<P> {
    fn default() -> Self {
        Self { providers: Vec::new() }
    }
}

impl<P: ConfigProvider> CompositeConfigProvider<P> {
    /// Create a new composite config provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider to the chain
    pub fn add_provider(&mut self, provider: P) {
        self.providers.push(provider);
    }
}

impl<P: ConfigProvider> ConfigProvider for CompositeConfigProvider<P> {
    fn get_string(&self, key: &str) -> Result<String> {
        for provider in &self.providers {
            if let Ok(value) = provider.get_string(key) {
                return Ok(value);
            }
        }

        Err(ServiceError::configuration(format!("Configuration key not found in any provider: {}", key)))
    }
}

/// Global default configuration provider.
///
/// `HR_TRANSLATE_*` variables take precedence over bare ones, so a plain
/// `OPENAI_API_KEY` is picked up when nothing more specific is set.
pub static DEFAULT_PROVIDER: Lazy<Arc<CompositeConfigProvider<EnvConfigProvider>>> = Lazy::new(|| {
    let mut provider = CompositeConfigProvider::new();
    provider.add_provider(EnvConfigProvider::new().with_prefix("HR_TRANSLATE"));
    provider.add_provider(EnvConfigProvider::new());
    Arc::new(provider)
});

/// Trait for service-specific configuration
pub trait ServiceConfig: Debug + Send + Sync {
    /// Validate this configuration
    fn validate(&self) -> Result<()>;

    /// Service name
    fn service_name(&self) -> &str;
}

/// Configuration for the OpenAI-compatible generation backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// Access token. `None` means the model path is never attempted.
    pub api_key: Option<String>,

    /// Organization ID (optional)
    pub org_id: Option<String>,

    /// Base URL (can be changed for proxies)
    pub base_url: String,

    /// Model used for generation
    pub model: String,

    /// Timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            org_id: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            timeout_seconds: 30,
        }
    }
}

impl OpenAIConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let api_key = provider.get_non_empty("openai_api_key");
        let org_id = provider.get_non_empty("openai_org_id");
        let base_url = provider.get_string_or("openai_base_url", DEFAULT_OPENAI_BASE_URL);
        let model = provider.get_string_or("openai_model", DEFAULT_OPENAI_MODEL);
        let timeout_seconds = provider.get_int_or("openai_timeout_seconds", 30);

        if timeout_seconds <= 0 {
            return Err(ServiceError::configuration(format!(
                "OpenAI timeout must be positive, got {}",
                timeout_seconds
            )));
        }

        let config = Self {
            api_key,
            org_id,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            timeout_seconds: timeout_seconds as u64,
        };

        config.validate()?;
        Ok(config)
    }

    /// Whether an access token is available
    pub fn has_credentials(&self) -> bool {
        self.api_key.as_deref().map_or(false, |key| !key.trim().is_empty())
    }
}

impl ServiceConfig for OpenAIConfig {
    fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ServiceError::configuration("OpenAI base URL is required"));
        }

        url::Url::parse(&self.base_url)
            .map_err(|e| ServiceError::configuration(format!("Invalid OpenAI base URL {}: {}", self.base_url, e)))?;

        if self.model.is_empty() {
            return Err(ServiceError::configuration("OpenAI model is required"));
        }

        if self.timeout_seconds == 0 {
            return Err(ServiceError::configuration("OpenAI timeout must be positive"));
        }

        Ok(())
    }

    fn service_name(&self) -> &str {
        "openai"
    }
}

/// Configuration shared by both translators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    /// Generation backend settings
    pub openai: OpenAIConfig,

    /// Year presented to the model as the current year when interpreting dates
    pub reference_year: i32,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            openai: OpenAIConfig::default(),
            reference_year: DEFAULT_REFERENCE_YEAR,
        }
    }
}

impl TranslatorConfig {
    /// Load configuration from a config provider
    pub fn from_provider<P: ConfigProvider + ?Sized>(provider: &P) -> Result<Self> {
        let openai = OpenAIConfig::from_provider(provider)?;
        let reference_year = provider.get_int_or("reference_year", DEFAULT_REFERENCE_YEAR as i64);

        let config = Self {
            openai,
            reference_year: i32::try_from(reference_year)
                .map_err(|_| ServiceError::configuration(format!("Invalid reference year: {}", reference_year)))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_provider(&**DEFAULT_PROVIDER)
    }
}

impl ServiceConfig for TranslatorConfig {
    fn validate(&self) -> Result<()> {
        self.openai.validate()?;

        if !(2000..=2099).contains(&self.reference_year) {
            return Err(ServiceError::configuration(format!(
                "Reference year out of range: {}",
                self.reference_year
            )));
        }

        Ok(())
    }

    fn service_name(&self) -> &str {
        "translator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_config_provider_key_format() {
        let provider = EnvConfigProvider::new()
            .with_prefix("TEST")
            .with_namespace("CONFIG");

        assert_eq!(provider.format_key("api_key"), "TEST_CONFIG_API_KEY");
        assert_eq!(provider.format_key("base-url"), "TEST_CONFIG_BASE_URL");

        let bare = EnvConfigProvider::new();
        assert_eq!(bare.format_key("openai_api_key"), "OPENAI_API_KEY");
    }

    #[test]
    fn test_openai_config_without_key() {
        let provider = MemoryConfigProvider::new();

        let config = OpenAIConfig::from_provider(&provider).unwrap();
        assert!(config.api_key.is_none());
        assert!(!config.has_credentials());
        assert_eq!(config.base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.model, DEFAULT_OPENAI_MODEL);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_blank_key_counts_as_absent() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("openai_api_key", "   ");

        let config = OpenAIConfig::from_provider(&provider).unwrap();
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_openai_config_overrides() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("openai_api_key", "test_api_key");
        provider.set("openai_base_url", "https://proxy.example.com/v1/");
        provider.set("openai_model", "gpt-4o-mini");
        provider.set("openai_timeout_seconds", "5");

        let config = OpenAIConfig::from_provider(&provider).unwrap();
        assert!(config.has_credentials());
        assert_eq!(config.base_url, "https://proxy.example.com/v1");
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout_seconds, 5);
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let mut provider = MemoryConfigProvider::new();
        provider.set("openai_base_url", "not a url");

        assert!(OpenAIConfig::from_provider(&provider).is_err());
    }
}
