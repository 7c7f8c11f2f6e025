use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{
    Candidate, CandidatePart, ContentPart, GenerationRequest, GenerationResponse, PromptFeedback, Provider,
    RateLimiter, RetryPolicy, TaskKind, map_status_error, map_transport_error,
};

/// Anthropic client for interacting with Anthropic API
pub struct Anthropic {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL (optional, defaults to public API)
    endpoint: String,
    /// Model used by `test_connection`
    model: String,
    /// Request timeout, reported in timeout errors
    timeout_secs: u64,
    /// Retry and backoff settings
    retry: RetryPolicy,
    /// Requests-per-minute pacing
    limiter: RateLimiter,
}

impl std::fmt::Debug for Anthropic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Anthropic")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Anthropic message request
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<AnthropicMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Anthropic message format
#[derive(Debug, Serialize)]
pub struct AnthropicMessage {
    /// Role of the message sender (user, assistant)
    pub role: String,

    /// Content blocks of the message
    pub content: Vec<AnthropicContentBlock>,
}

/// Request content block
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContentBlock {
    Text { text: String },
    Document { source: AnthropicSource },
    Image { source: AnthropicSource },
}

/// Base64 payload of a document or image block
#[derive(Debug, Serialize)]
pub struct AnthropicSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub media_type: String,
    pub data: String,
}

/// Token usage information
#[derive(Debug, Default, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    #[serde(default)]
    pub input_tokens: u32,
    /// Number of output tokens
    #[serde(default)]
    pub output_tokens: u32,
}

/// Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    /// The content of the response
    #[serde(default)]
    pub content: Vec<AnthropicContent>,
    /// Why generation stopped
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Token usage information
    #[serde(default)]
    pub usage: TokenUsage,
}

/// Individual content block in an Anthropic response
#[derive(Debug, Deserialize)]
pub struct AnthropicContent {
    /// The type of content
    #[serde(rename = "type")]
    pub content_type: String,

    /// The text content, present on text blocks
    #[serde(default)]
    pub text: Option<String>,
}

impl AnthropicRequest {
    /// Build the wire request from a provider-independent one
    pub fn from_generation(request: &GenerationRequest) -> Self {
        let content = request
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => AnthropicContentBlock::Text { text: text.clone() },
                ContentPart::Blob { mime_type, data } => {
                    let source = AnthropicSource {
                        source_type: "base64".to_string(),
                        media_type: mime_type.clone(),
                        data: STANDARD.encode(data),
                    };
                    if mime_type.starts_with("image/") {
                        AnthropicContentBlock::Image { source }
                    } else {
                        AnthropicContentBlock::Document { source }
                    }
                }
            })
            .collect();

        Self {
            model: request.model.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content,
            }],
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        }
    }
}

impl AnthropicResponse {
    /// Convert into the provider-independent response.
    ///
    /// A `refusal` stop reason becomes block feedback with no candidates.
    pub fn into_generation(self) -> GenerationResponse {
        if self.stop_reason.as_deref() == Some("refusal") {
            return GenerationResponse {
                text: None,
                candidates: Vec::new(),
                prompt_feedback: Some(PromptFeedback {
                    block_reason: Some("refusal".to_string()),
                    safety_ratings: Vec::new(),
                }),
            };
        }

        let parts: Vec<CandidatePart> = self
            .content
            .into_iter()
            .filter(|c| c.content_type == "text")
            .map(|c| CandidatePart { text: c.text })
            .collect();

        let joined: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        let text = if joined.is_empty() { None } else { Some(joined) };

        GenerationResponse {
            text,
            candidates: vec![Candidate {
                parts,
                finish_reason: self.stop_reason,
            }],
            prompt_feedback: None,
        }
    }
}

impl Anthropic {
    /// Create a new Anthropic client
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new_with_config(api_key, endpoint, model, 120, RetryPolicy::default(), None)
    }

    /// Create a new Anthropic client with explicit retry, timeout and rate settings
    pub fn new_with_config(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
        retry: RetryPolicy,
        rate_limit: Option<u32>,
    ) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            timeout_secs,
            retry,
            limiter: RateLimiter::new(rate_limit),
        }
    }

    fn api_url(&self) -> String {
        if self.endpoint.is_empty() {
            "https://api.anthropic.com/v1/messages".to_string()
        } else {
            format!("{}/v1/messages", self.endpoint.trim_end_matches('/'))
        }
    }

    /// Complete a messages request
    async fn complete(&self, url: &str, request: &AnthropicRequest) -> Result<Option<GenerationResponse>, ProviderError> {
        self.limiter.acquire().await;

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(request)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.timeout_secs))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read Anthropic response body: {}", e)))?;

        if !status.is_success() {
            error!("Anthropic API error ({}): {}", status, response_text);
            return Err(map_status_error(status, response_text));
        }

        parse_response_body(&response_text)
    }
}

/// Parse a messages body. An empty or `null` body means no response object.
pub fn parse_response_body(body: &str) -> Result<Option<GenerationResponse>, ProviderError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }

    let parsed: AnthropicResponse = serde_json::from_str(trimmed)
        .map_err(|e| ProviderError::ParseError(format!("Failed to parse Anthropic API response: {}", e)))?;

    debug!(
        "Anthropic usage: {} input tokens, {} output tokens",
        parsed.usage.input_tokens, parsed.usage.output_tokens
    );

    Ok(Some(parsed.into_generation()))
}

#[async_trait]
impl Provider for Anthropic {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Option<GenerationResponse>, ProviderError> {
        let url = self.api_url();
        let body = AnthropicRequest::from_generation(&request);

        let label = format!("Anthropic {} for '{}'", request.task.label(), request.subject);
        self.retry.run(&label, || self.complete(&url, &body)).await
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = GenerationRequest::new(TaskKind::DocumentAnalysis, "connection test", self.model.clone(), 10)
            .part(ContentPart::text("Hello"));
        self.generate(request).await.map(|_| ())
    }
}
