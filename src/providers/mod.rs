/*!
 * Provider implementations for the LLM services used by the pipeline.
 *
 * This module contains client implementations for various LLM providers:
 * - Gemini: Google Generative Language API (default)
 * - Anthropic: Anthropic Messages API
 * - Mock: scripted provider for tests and benchmarks
 *
 * Every provider speaks the same small contract: an ordered list of content
 * parts goes in, and a response exposing primary text, candidates or block
 * feedback comes out (or nothing at all, or an error).
 */

use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::Mutex;
use std::fmt::Debug;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::errors::ProviderError;

/// What a request is for. Not sent over the wire; used for logging and by mocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Standalone analysis of one document
    DocumentAnalysis,
    /// Joint analysis of every COBOL source in the input
    ProgramAnalysis,
    /// COBOL to target-language migration of one source
    Transcription,
    /// Integration guide for one migrated source
    IntegrationGuide,
}

impl TaskKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::DocumentAnalysis => "Analysis",
            Self::ProgramAnalysis => "Combined Analysis",
            Self::Transcription => "Transcription",
            Self::IntegrationGuide => "Application Guide",
        }
    }
}

/// One piece of request content
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    /// Plain text
    Text(String),
    /// Raw bytes tagged with their mime type (e.g. a PDF)
    Blob {
        mime_type: String,
        data: Vec<u8>,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn blob(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self::Blob {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// The text of this part, if it is a text part
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Blob { .. } => None,
        }
    }
}

/// A provider-independent generation request
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Model identifier
    pub model: String,
    /// Ordered content parts
    pub parts: Vec<ContentPart>,
    /// Maximum number of output tokens
    pub max_output_tokens: u32,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// What this request is for
    pub task: TaskKind,
    /// The file (or group) this request is about
    pub subject: String,
}

impl GenerationRequest {
    /// Create a new request with no content
    pub fn new(task: TaskKind, subject: impl Into<String>, model: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            model: model.into(),
            parts: Vec::new(),
            max_output_tokens,
            temperature: None,
            task,
            subject: subject.into(),
        }
    }

    /// Append a content part
    pub fn part(mut self, part: ContentPart) -> Self {
        self.parts.push(part);
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Concatenation of all text parts, mostly for logging and mocks
    pub fn prompt_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether any part carries binary data
    pub fn has_binary(&self) -> bool {
        self.parts.iter().any(|p| matches!(p, ContentPart::Blob { .. }))
    }
}

/// One part of a candidate's content
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidatePart {
    pub text: Option<String>,
}

/// An alternative response produced by the model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    /// Content parts; empty when the candidate carries no content
    pub parts: Vec<CandidatePart>,
    /// Why generation stopped, as reported by the service
    pub finish_reason: Option<String>,
}

impl Candidate {
    /// Candidate holding a single text part
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![CandidatePart { text: Some(text.into()) }],
            finish_reason: None,
        }
    }
}

/// A safety rating attached to block feedback
#[derive(Debug, Clone, PartialEq)]
pub struct SafetyRating {
    pub category: String,
    pub probability: String,
}

/// Feedback explaining why a prompt or response was blocked
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
    pub safety_ratings: Vec<SafetyRating>,
}

/// A provider-independent generation response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationResponse {
    /// Primary textual payload
    pub text: Option<String>,
    /// Alternative candidates
    pub candidates: Vec<Candidate>,
    /// Block feedback, when the service refused
    pub prompt_feedback: Option<PromptFeedback>,
}

impl GenerationResponse {
    /// Response with just a primary text payload
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be injected into the pipeline interchangeably.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Run a generation request
    ///
    /// # Returns
    /// * `Ok(Some(response))` - the service answered
    /// * `Ok(None)` - the service returned no response object
    /// * `Err(ProviderError)` - the call itself failed
    async fn generate(&self, request: GenerationRequest) -> Result<Option<GenerationResponse>, ProviderError>;

    /// Test the connection to the provider
    async fn test_connection(&self) -> Result<(), ProviderError>;
}

/// Classify a non-success HTTP status
pub fn map_status_error(status: reqwest::StatusCode, body: String) -> ProviderError {
    match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => ProviderError::AuthenticationError(body),
        reqwest::StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(body),
        _ => ProviderError::ApiError {
            status_code: status.as_u16(),
            message: body,
        },
    }
}

/// Classify a transport-level reqwest failure
pub fn map_transport_error(error: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if error.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else if error.is_connect() {
        ProviderError::ConnectionError(error.to_string())
    } else {
        ProviderError::RequestFailed(error.to_string())
    }
}

/// Retry settings shared by the HTTP providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Base backoff time in milliseconds, doubled for each retry
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base_ms: u64) -> Self {
        Self {
            max_retries,
            backoff_base_ms,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(1u64 << shift))
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or retries run out
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                tokio::time::sleep(self.backoff(attempt)).await;
            }

            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!("{} failed (attempt {}/{}): {}", label, attempt, self.max_retries + 1, e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Spaces requests out to honor a requests-per-minute limit
#[derive(Debug, Default)]
pub struct RateLimiter {
    rate_limit: Option<u32>,
    next_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(rate_limit: Option<u32>) -> Self {
        Self {
            rate_limit: rate_limit.filter(|r| *r > 0),
            next_slot: Mutex::new(None),
        }
    }

    /// Minimum spacing between two requests
    pub fn interval(&self) -> Option<Duration> {
        self.rate_limit.map(|rpm| Duration::from_millis(60_000 / rpm as u64))
    }

    /// Wait until the next request slot is free and reserve it
    pub async fn acquire(&self) {
        let Some(interval) = self.interval() else {
            return;
        };

        let wait = {
            let mut next_slot = self.next_slot.lock();
            let now = Instant::now();
            let slot = match *next_slot {
                Some(slot) if slot > now => slot,
                _ => now,
            };
            *next_slot = Some(slot + interval);
            slot.saturating_duration_since(now)
        };

        if !wait.is_zero() {
            debug!("Rate limiting request for {:?}", wait);
            tokio::time::sleep(wait).await;
        }
    }
}

pub mod anthropic;
pub mod gemini;
pub mod mock;
