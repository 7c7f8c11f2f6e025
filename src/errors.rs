/*!
 * Error types for the cobmig application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions. Per-unit failures
 * (LLM calls, undecodable files) are recorded as data in the run result; only
 * the errors below that reach `PipelineError` abort a run.
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The request did not complete within the client timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),
}

impl ProviderError {
    /// Whether a retry has a chance of succeeding
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ConnectionError(_) | Self::RateLimitExceeded(_) | Self::Timeout(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

/// Failure to read one file out of its container
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Error collecting file '{filename}': {message}")]
pub struct LoadError {
    /// Path of the file inside the container
    pub filename: String,
    /// Underlying reason, kept verbatim
    pub message: String,
}

/// Errors raised by the repository clone collaborator
#[derive(Error, Debug)]
pub enum CloneError {
    /// The URL is not an accepted repository URL
    #[error("Invalid repository URL '{url}': {reason}")]
    InvalidUrl {
        url: String,
        reason: String,
    },

    /// git ran but exited with a failure code
    #[error("Error cloning repository {url}. Return code: {code:?}\nStdout: {stdout}\nStderr: {stderr}")]
    NonZeroExit {
        url: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// git is not installed or not on PATH
    #[error("Git command not found. Please ensure Git is installed and in your system's PATH.")]
    GitNotFound,

    /// Any other I/O failure around the clone
    #[error("Unexpected error during repository cloning: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that abort a whole pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input container could not be opened or enumerated
    #[error("The input is not a valid archive: {0}")]
    Container(String),

    /// Building the output artifacts failed
    #[error("Error creating the output archive: {0}")]
    Packaging(String),

    /// The repository could not be cloned
    #[error("Repository error: {0}")]
    Clone(#[from] CloneError),

    /// The background worker running the pipeline died
    #[error("Pipeline worker failed: {0}")]
    Worker(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error in the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the pipeline
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
