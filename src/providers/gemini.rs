use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::error;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{
    Candidate, CandidatePart, ContentPart, GenerationRequest, GenerationResponse, PromptFeedback, Provider,
    RateLimiter, RetryPolicy, SafetyRating, TaskKind, map_status_error, map_transport_error,
};

/// Gemini client for the Generative Language `generateContent` API
pub struct Gemini {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API base URL
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

impl std::fmt::Debug for Gemini {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gemini")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("retry", &self.retry)
            .field("limiter", &self.limiter)
            .finish()
    }
}

/// generateContent request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

/// A content turn
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// A single part of a content turn
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<GeminiBlob>,
}

/// Inline binary data, base64 encoded
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiBlob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// generateContent response body
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
    #[serde(default)]
    pub safety_ratings: Vec<GeminiSafetyRating>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiSafetyRating {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub probability: String,
}

impl GeminiRequest {
    /// Build the wire request from a provider-independent one
    pub fn from_generation(request: &GenerationRequest) -> Self {
        let parts = request
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => GeminiPart {
                    text: Some(text.clone()),
                    inline_data: None,
                },
                ContentPart::Blob { mime_type, data } => GeminiPart {
                    text: None,
                    inline_data: Some(GeminiBlob {
                        mime_type: mime_type.clone(),
                        data: STANDARD.encode(data),
                    }),
                },
            })
            .collect();

        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GeminiGenerationConfig {
                max_output_tokens: request.max_output_tokens,
                temperature: request.temperature,
            },
        }
    }
}

impl GeminiResponse {
    /// Convert into the provider-independent response.
    ///
    /// The primary text is the concatenated text of the first candidate, the
    /// same way the official SDKs compute their `text` accessor.
    pub fn into_generation(self) -> GenerationResponse {
        let candidates: Vec<Candidate> = self
            .candidates
            .into_iter()
            .map(|c| Candidate {
                parts: c
                    .content
                    .map(|content| {
                        content
                            .parts
                            .into_iter()
                            .map(|p| CandidatePart { text: p.text })
                            .collect()
                    })
                    .unwrap_or_default(),
                finish_reason: c.finish_reason,
            })
            .collect();

        let text = candidates.first().and_then(|first| {
            let joined: String = first.parts.iter().filter_map(|p| p.text.as_deref()).collect();
            if joined.is_empty() { None } else { Some(joined) }
        });

        let prompt_feedback = self.prompt_feedback.map(|feedback| PromptFeedback {
            block_reason: feedback.block_reason,
            safety_ratings: feedback
                .safety_ratings
                .into_iter()
                .map(|r| SafetyRating {
                    category: r.category,
                    probability: r.probability,
                })
                .collect(),
        });

        GenerationResponse {
            text,
            candidates,
            prompt_feedback,
        }
    }
}

impl Gemini {
    /// Create a new Gemini client with default retry settings
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new_with_config(api_key, endpoint, model, 120, RetryPolicy::default(), None)
    }

    /// Create a new Gemini client with explicit retry, timeout and rate settings
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

    fn api_url(&self, model: &str) -> String {
        let base = if self.endpoint.is_empty() {
            "https://generativelanguage.googleapis.com"
        } else {
            self.endpoint.trim_end_matches('/')
        };
        format!("{}/v1beta/models/{}:generateContent", base, model)
    }

    async fn send_once(&self, url: &str, body: &GeminiRequest) -> Result<Option<GenerationResponse>, ProviderError> {
        self.limiter.acquire().await;

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.timeout_secs))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read Gemini response body: {}", e)))?;

        if !status.is_success() {
            return Err(map_status_error(status, response_text));
        }

        parse_response_body(&response_text)
    }
}

/// Parse a generateContent body. An empty or `null` body means no response object.
pub fn parse_response_body(body: &str) -> Result<Option<GenerationResponse>, ProviderError> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }

    let parsed: GeminiResponse = serde_json::from_str(trimmed).map_err(|e| {
        let preview: String = trimmed.chars().take(500).collect();
        error!("Failed to parse Gemini API response: {}. Raw response (first 500 chars): {}", e, preview);
        ProviderError::ParseError(e.to_string())
    })?;

    Ok(Some(parsed.into_generation()))
}

#[async_trait]
impl Provider for Gemini {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Option<GenerationResponse>, ProviderError> {
        let url = self.api_url(&request.model);
        let body = GeminiRequest::from_generation(&request);

        let label = format!("Gemini {} for '{}'", request.task.label(), request.subject);
        self.retry.run(&label, || self.send_once(&url, &body)).await
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let request = GenerationRequest::new(TaskKind::DocumentAnalysis, "connection test", self.model.clone(), 10)
            .part(ContentPart::text("Hello"));
        self.generate(request).await.map(|_| ())
    }
}
