use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn, error};

use crate::models::{GenerationResult, PetDescriptor, ResponseFormat};
use crate::openai::{OpenAiError, TextGenerator};
use crate::prompt::{build_prompt, PromptError, DELIMITER};

pub const DEFAULT_MAX_RETRIES: usize = 3;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Template(#[from] PromptError),
    #[error("service error: {0}")]
    Transport(#[from] OpenAiError),
    #[error("parse error: expected {expected} '|'-separated segments, got {actual}")]
    Parse { expected: usize, actual: usize },
}

/// One name-generation pipeline: validate, normalize, prompt, call the
/// service, parse the delimited response, retry on failure.
///
/// Holds no mutable state; a fresh instance is constructed per invocation so
/// one request's configuration can never leak into another's.
pub struct NameGenerator {
    service: Arc<dyn TextGenerator>,
    format: ResponseFormat,
    max_retries: usize,
}

impl NameGenerator {
    pub fn new(service: Arc<dyn TextGenerator>, format: ResponseFormat) -> Self {
        Self::with_max_retries(service, format, DEFAULT_MAX_RETRIES)
    }

    pub fn with_max_retries(
        service: Arc<dyn TextGenerator>,
        format: ResponseFormat,
        max_retries: usize,
    ) -> Self {
        Self {
            service,
            format,
            // Zero attempts would make the loop unreachable.
            max_retries: max_retries.max(1),
        }
    }

    /// Runs the full pipeline. Retryable failures (transport, parse) never
    /// escape as errors: after exhausting the attempt bound the last failure
    /// is converted into a `GenerationResult` with `error` populated.
    pub async fn generate(&self, descriptor: &PetDescriptor, creativity: f32) -> GenerationResult {
        match self.try_generate(descriptor, creativity).await {
            Ok(result) => result,
            Err(e) => {
                let msg = format!("Failed to generate name: {}", e);
                error!("❌ {}", msg);
                GenerationResult::failure(msg)
            }
        }
    }

    async fn try_generate(
        &self,
        descriptor: &PetDescriptor,
        creativity: f32,
    ) -> Result<GenerationResult, GenerateError> {
        let descriptor = descriptor.normalized();
        if descriptor.species.is_empty() || descriptor.color.is_empty() {
            return Err(GenerateError::Validation(
                "animal type and color cannot be empty".into(),
            ));
        }

        // Template errors fail fast like validation: no attempt is made.
        let prompt = build_prompt(&descriptor, self.format)?;
        let temperature = creativity.clamp(0.0, 1.0);

        info!("🎯 Generating name for {} {}", descriptor.color, descriptor.species);

        let mut attempt = 1;
        loop {
            match self.attempt(&prompt, temperature).await {
                Ok(segments) => {
                    info!("✅ Name generated on attempt {}", attempt);
                    return Ok(assemble(segments, &descriptor));
                }
                Err(e) if attempt < self.max_retries => {
                    warn!("Attempt {} failed: {}", attempt, e);
                    attempt += 1;
                }
                Err(e) => {
                    warn!("Attempt {} failed: {}", attempt, e);
                    return Err(e);
                }
            }
        }
    }

    /// One call-and-parse cycle. Transport and parse failures are typed
    /// distinctly but retried identically by the caller.
    async fn attempt(&self, prompt: &str, temperature: f32) -> Result<Vec<String>, GenerateError> {
        let raw = self.service.complete(prompt, temperature).await?;
        parse_segments(&raw, self.format)
    }
}

/// Splits the raw response on the literal delimiter and requires exactly the
/// expected segment count. A stray delimiter inside an explanation shifts the
/// count and fails the attempt; the prompt instructs the service not to emit
/// one, but the contract is soft and only enforced here.
fn parse_segments(raw: &str, format: ResponseFormat) -> Result<Vec<String>, GenerateError> {
    let segments: Vec<String> = raw
        .split(DELIMITER)
        .map(|s| s.trim().to_string())
        .collect();
    let expected = format.field_count();
    if segments.len() != expected {
        return Err(GenerateError::Parse {
            expected,
            actual: segments.len(),
        });
    }
    Ok(segments)
}

fn assemble(segments: Vec<String>, descriptor: &PetDescriptor) -> GenerationResult {
    let mut fields = segments.into_iter();
    GenerationResult {
        name: fields.next(),
        explanation: fields.next(),
        fun_fact: fields.next(),
        nickname: fields.next(),
        gender: descriptor.gender.clone(),
        error: None,
    }
}
