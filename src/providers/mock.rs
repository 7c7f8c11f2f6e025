/*!
 * Mock provider implementations for testing.
 *
 * This module provides a scripted provider that simulates the response shapes
 * the pipeline has to cope with:
 * - `MockProvider::working()` - Always answers with primary text
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::blocked()` - Returns block feedback with safety ratings
 * - `MockProvider::null()` - Returns no response object at all
 *
 * Behaviors can be overridden per task kind, and every request is recorded so
 * tests can assert on what the pipeline sent.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{
    Candidate, CandidatePart, GenerationRequest, GenerationResponse, PromptFeedback, Provider, SafetyRating,
    TaskKind,
};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with primary text
    Working,
    /// Always fails with an error
    Failing,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Returns no response object
    Null,
    /// Returns block feedback and nothing else
    Blocked,
    /// Returns no primary text but candidates carrying text
    CandidatesOnly,
    /// Returns candidates whose parts carry no text
    CandidatesWithoutText,
    /// Returns a response with nothing usable in it
    Unexpected,
}

/// Mock provider for testing pipeline behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Default behavior mode
    behavior: MockBehavior,
    /// Behavior overrides per task kind
    task_behaviors: HashMap<TaskKind, MockBehavior>,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&GenerationRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            task_behaviors: HashMap::new(),
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a mock that returns no response object
    pub fn null() -> Self {
        Self::new(MockBehavior::Null)
    }

    /// Create a mock that blocks every prompt
    pub fn blocked() -> Self {
        Self::new(MockBehavior::Blocked)
    }

    /// Override the behavior for one kind of task
    pub fn with_task_behavior(mut self, task: TaskKind, behavior: MockBehavior) -> Self {
        self.task_behaviors.insert(task, behavior);
        self
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&GenerationRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Snapshot of every request received so far
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    /// Recorded requests of one task kind
    pub fn requests_for(&self, task: TaskKind) -> Vec<GenerationRequest> {
        self.requests.lock().iter().filter(|r| r.task == task).cloned().collect()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Default text answer for a request
    pub fn default_text(request: &GenerationRequest) -> String {
        match request.task {
            TaskKind::DocumentAnalysis => format!("Analysis of {}", request.subject),
            TaskKind::ProgramAnalysis => format!("Program analysis of {}", request.subject),
            TaskKind::Transcription => format!(
                "Here is the migrated code:\n```\n// migrated from {}\n```\nDone.",
                request.subject
            ),
            TaskKind::IntegrationGuide => format!("Guide for {}", request.subject),
        }
    }

    fn answer(&self, request: &GenerationRequest) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => Self::default_text(request),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<Option<GenerationResponse>, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        let behavior = self
            .task_behaviors
            .get(&request.task)
            .copied()
            .unwrap_or(self.behavior);

        match behavior {
            MockBehavior::Working => Ok(Some(GenerationResponse::from_text(self.answer(&request)))),

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Some(GenerationResponse::from_text(self.answer(&request))))
                }
            }

            MockBehavior::Null => Ok(None),

            MockBehavior::Blocked => Ok(Some(GenerationResponse {
                text: None,
                candidates: Vec::new(),
                prompt_feedback: Some(PromptFeedback {
                    block_reason: Some("SAFETY".to_string()),
                    safety_ratings: vec![
                        SafetyRating {
                            category: "HARM_CATEGORY_DANGEROUS_CONTENT".to_string(),
                            probability: "HIGH".to_string(),
                        },
                        SafetyRating {
                            category: "HARM_CATEGORY_HARASSMENT".to_string(),
                            probability: "LOW".to_string(),
                        },
                    ],
                }),
            })),

            MockBehavior::CandidatesOnly => Ok(Some(GenerationResponse {
                text: None,
                candidates: vec![
                    Candidate::with_text(self.answer(&request)),
                    Candidate::with_text("(alternative)"),
                ],
                prompt_feedback: None,
            })),

            MockBehavior::CandidatesWithoutText => Ok(Some(GenerationResponse {
                text: None,
                candidates: vec![Candidate {
                    parts: vec![CandidatePart { text: None }],
                    finish_reason: Some("MAX_TOKENS".to_string()),
                }],
                prompt_feedback: None,
            })),

            MockBehavior::Unexpected => Ok(Some(GenerationResponse::default())),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated connection failure".to_string())),
            _ => Ok(()),
        }
    }
}
