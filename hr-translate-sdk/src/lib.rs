//! # HR Translate SDK
//!
//! Natural-language translation for the HR bulk-edit wizard.
//!
//! This crate provides:
//!
//! - A query translator turning free text into a structured employee `SearchFilter`
//! - A change translator turning a bulk-edit instruction into a `ChangeConfiguration`
//! - Staged edits and the review-step validation summary
//! - An OpenAI structured-output client used as the generation backend
//! - Error handling and configuration management utilities
//!
//! ## Architecture
//!
//! Both translators are a `Translator` over a `Translation`. Each call runs
//! the model strategy when credentials are configured and drops to a
//! deterministic keyword parser otherwise, or when the model call fails.
//! Callers always get a `ResultEnvelope` back; errors never escape a
//! translation.
//!
//! - `Generator`: schema-constrained generation backend (`OpenAIClient`)
//! - `Translation`: prompts, schema, acceptance checks and fallback for one kind of request
//! - `ServiceError`: error type used inside the crate

// Re-export core modules
pub mod core;
pub use crate::core::{GenerationRequest, Generator, OutputSchema};

// Re-export service-specific modules
pub mod services;
pub use services::openai;

// Re-export error handling
pub mod error;
pub use error::{ErrorContext, Result, ServiceError};

// Re-export configuration management
pub mod config;
pub use config::{ConfigProvider, OpenAIConfig, ServiceConfig, TranslatorConfig};

// Translation strategy and result envelope
pub mod translate;
pub use translate::{ResultEnvelope, Strategy, Translation, Translator, FALLBACK_REASON};

// Domain
pub mod changes;
pub mod employee;
pub mod query;
pub mod vocabulary;
pub use changes::{
    ChangeConfiguration, ChangeOperation, ChangeRequest, ChangeTranslation, ChangeTranslator, PendingEdits,
    ValidationSummary,
};
pub use employee::Employee;
pub use query::{QueryTranslation, QueryTranslator, SearchFilter};
pub use vocabulary::EmployeeField;

// Utility module for common functionality
mod util;

#[cfg(test)]
mod tests;

use log::error;

use crate::config::{ConfigProviderExt, DEFAULT_PROVIDER};

/// Translator settings loaded from a provider
enum Settings {
    Valid(TranslatorConfig),

    /// The settings failed validation; `has_credentials` records whether an
    /// access token was present anyway
    Invalid { has_credentials: bool },
}

fn load_settings<P: ConfigProvider + ?Sized>(provider: &P) -> Settings {
    match TranslatorConfig::from_provider(provider) {
        Ok(config) => Settings::Valid(config),
        Err(e) => {
            error!("Invalid translator configuration: {}", util::sanitize_for_logging(&e.to_string()));
            Settings::Invalid {
                has_credentials: provider.get_non_empty("openai_api_key").is_some(),
            }
        }
    }
}

/// Translator over `translation` for settings that did not validate.
///
/// Without an access token the model would never have been tried, so the
/// envelope carries no reason.
fn misconfigured<T: Translation>(translation: T, has_credentials: bool) -> Translator<T> {
    if has_credentials {
        Translator::unavailable(translation)
    } else {
        Translator::heuristic_only(translation)
    }
}

/// Create a query translator configured from `provider`
pub fn query_translator_from<P: ConfigProvider + ?Sized>(provider: &P) -> QueryTranslator {
    match load_settings(provider) {
        Settings::Valid(config) => QueryTranslator::from_config(&config),
        Settings::Invalid { has_credentials } => misconfigured(QueryTranslation::default(), has_credentials),
    }
}

/// Create a change translator configured from `provider`
pub fn change_translator_from<P: ConfigProvider + ?Sized>(provider: &P) -> ChangeTranslator {
    match load_settings(provider) {
        Settings::Valid(config) => ChangeTranslator::from_config(&config),
        Settings::Invalid { has_credentials } => misconfigured(ChangeTranslation::default(), has_credentials),
    }
}

/// Create a query translator configured from the environment
pub fn query_translator() -> QueryTranslator {
    query_translator_from(&**DEFAULT_PROVIDER)
}

/// Create a change translator configured from the environment
pub fn change_translator() -> ChangeTranslator {
    change_translator_from(&**DEFAULT_PROVIDER)
}

/// Translate an employee search query using environment configuration
pub async fn translate_query(text: &str) -> ResultEnvelope<SearchFilter> {
    query_translator().translate_query(text).await
}

/// Translate a bulk change instruction using environment configuration
pub async fn translate_changes(text: &str, selected_count: usize) -> ResultEnvelope<ChangeConfiguration> {
    change_translator().translate_changes(text, selected_count).await
}
