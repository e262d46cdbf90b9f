//! Dual-strategy translation
//!
//! A `Translator` runs one `Translation` per call with exactly one of two
//! strategies:
//!
//! - `Strategy::Model`: schema-constrained generation through a `Generator`,
//!   decoded into the typed output and checked by `Translation::accept`.
//! - `Strategy::Heuristic`: the translation's deterministic keyword parser.
//!
//! The model strategy is chosen only when a generator is configured. If the
//! model call fails for any reason the heuristic runs once, immediately, and
//! the envelope records why. There are no retries and nothing is cached
//! between calls.

pub mod envelope;
pub use envelope::{ResultEnvelope, FALLBACK_REASON};

use std::sync::Arc;

use log::{debug, error, info};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::OpenAIConfig;
use crate::core::{GenerationRequest, Generator};
use crate::error::{Result, ServiceError};
use crate::services::openai::OpenAIClient;
use crate::util::{measure_time_async, sanitize_for_logging, truncate_string};

/// One kind of natural-language translation
pub trait Translation: Send + Sync {
    /// What the caller passes in
    type Input: ?Sized + Send + Sync;

    /// Structured result, decodable from the model's JSON output
    type Output: DeserializeOwned + Send;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// The user's raw text, for logging
    fn text<'a>(&self, input: &'a Self::Input) -> &'a str;

    /// Generation request for the model strategy
    fn request(&self, input: &Self::Input) -> GenerationRequest;

    /// Check and normalize a decoded model output; an error triggers the fallback
    fn accept(&self, output: Self::Output) -> Result<Self::Output>;

    /// Deterministic keyword parser. Never fails.
    fn fallback(&self, input: &Self::Input) -> Self::Output;
}

/// How a translator reaches the generative service
#[derive(Clone)]
enum Backend {
    /// A generator is ready to use
    Model(Arc<dyn Generator>),

    /// No credentials: the model is never attempted
    Unconfigured,

    /// Credentials exist but the backend could not be constructed
    Unavailable,
}

/// The strategy selected for an invocation
#[derive(Clone, Copy)]
pub enum Strategy<'a> {
    /// Schema-constrained generation
    Model(&'a dyn Generator),

    /// Keyword parser, with the reason the model was bypassed (if any)
    Heuristic { reason: Option<&'static str> },
}

impl Strategy<'_> {
    /// Whether this is the model strategy
    pub fn is_model(&self) -> bool {
        matches!(self, Strategy::Model(_))
    }
}

/// Orchestrates a translation across the model and heuristic strategies
#[derive(Clone)]
pub struct Translator<T: Translation> {
    translation: T,
    backend: Backend,
}

impl<T: Translation> Translator<T> {
    /// Build a translator, creating an OpenAI backend if credentials are present
    pub fn new(translation: T, config: &OpenAIConfig) -> Self {
        let backend = if !config.has_credentials() {
            Backend::Unconfigured
        } else {
            match OpenAIClient::new_with_config(config.clone()) {
                Ok(client) => Backend::Model(Arc::new(client)),
                Err(e) => {
                    error!(
                        "Failed to initialise OpenAI backend for {} translation: {}",
                        translation.name(),
                        sanitize_for_logging(&e.to_string())
                    );
                    Backend::Unavailable
                }
            }
        };

        Self { translation, backend }
    }

    /// Build a translator around an existing generator
    pub fn with_generator(translation: T, generator: Arc<dyn Generator>) -> Self {
        Self {
            translation,
            backend: Backend::Model(generator),
        }
    }

    /// Build a translator that only ever uses the heuristic parser
    pub fn heuristic_only(translation: T) -> Self {
        Self {
            translation,
            backend: Backend::Unconfigured,
        }
    }

    /// Build a translator whose backend could not be set up; every call degrades
    pub fn unavailable(translation: T) -> Self {
        Self {
            translation,
            backend: Backend::Unavailable,
        }
    }

    /// The wrapped translation
    pub fn translation(&self) -> &T {
        &self.translation
    }

    /// Select the strategy for the next invocation
    pub fn strategy(&self) -> Strategy<'_> {
        match &self.backend {
            Backend::Model(generator) => Strategy::Model(generator.as_ref()),
            Backend::Unconfigured => Strategy::Heuristic { reason: None },
            Backend::Unavailable => Strategy::Heuristic { reason: Some(FALLBACK_REASON) },
        }
    }

    /// Translate `input`. Always returns a usable envelope.
    #[instrument(skip_all, fields(translation = self.translation.name()))]
    pub async fn translate(&self, input: &T::Input) -> ResultEnvelope<T::Output> {
        let name = self.translation.name();
        debug!("Translating {} request: {:?}", name, truncate_string(self.translation.text(input), 80));

        match self.strategy() {
            Strategy::Heuristic { reason: None } => {
                info!("OpenAI API key not found, using fallback {} parser", name);
                ResultEnvelope::unconfigured(self.translation.fallback(input))
            }
            Strategy::Heuristic { reason: Some(_) } => {
                info!("Generation backend unavailable, using fallback {} parser", name);
                ResultEnvelope::degraded(self.translation.fallback(input))
            }
            Strategy::Model(generator) => {
                let (outcome, elapsed) = measure_time_async(|| self.run_model(generator, input)).await;

                match outcome {
                    Ok(output) => {
                        debug!("Model {} translation finished in {:?}", name, elapsed);
                        ResultEnvelope::from_model(output)
                    }
                    Err(e) => {
                        error!(
                            "Error processing natural language {} ({}): {}",
                            name,
                            e.category(),
                            sanitize_for_logging(&e.to_string())
                        );
                        info!("Falling back to basic {} parsing", name);
                        ResultEnvelope::degraded(self.translation.fallback(input))
                    }
                }
            }
        }
    }

    async fn run_model(&self, generator: &dyn Generator, input: &T::Input) -> Result<T::Output> {
        let request = self.translation.request(input);
        let value = generator.generate(request).await?;

        let output: T::Output = serde_json::from_value(value).map_err(|e| {
            ServiceError::validation(format!(
                "{} output does not match schema: {}",
                self.translation.name(),
                e
            ))
        })?;

        self.translation.accept(output)
    }
}
