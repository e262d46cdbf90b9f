//! Core abstractions for the translation SDK
//!
//! - `Generator`: schema-constrained text generation capability. Any
//!   generative backend can implement it; the translators only see this trait.
//! - `GenerationRequest`: system prompt, user prompt and the output schema.
//! - `OutputSchema`: a named JSON schema the backend must constrain output to.

pub mod schema;
pub use schema::OutputSchema;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// A single schema-constrained generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Instructions describing the domain vocabulary
    pub system_prompt: String,

    /// The task, usually quoting the user's text
    pub user_prompt: String,

    /// Shape the generated object must conform to
    pub schema: OutputSchema,
}

/// Capability interface for schema-constrained generation.
///
/// Implementations return the generated JSON object. Transport errors,
/// refusals and malformed output are all reported as errors; the caller
/// treats every error the same way.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate an object conforming to `request.schema`
    async fn generate(&self, request: GenerationRequest) -> Result<Value>;
}
