/*!
 * Tests for error types
 */

use cobmig::errors::{AppError, CloneError, LoadError, PipelineError, ProviderError};

/// Test which provider errors are retried
#[test]
fn test_providerError_isRetryable_shouldMatchTransientFailures() {
    assert!(ProviderError::Timeout(30).is_retryable());
    assert!(ProviderError::RateLimitExceeded("slow down".into()).is_retryable());
    assert!(ProviderError::ApiError {
        status_code: 503,
        message: "unavailable".into()
    }
    .is_retryable());
    assert!(!ProviderError::ApiError {
        status_code: 400,
        message: "bad request".into()
    }
    .is_retryable());
    assert!(!ProviderError::AuthenticationError("bad key".into()).is_retryable());
}

/// Test load error display
#[test]
fn test_loadError_display_shouldNameFile() {
    let error = LoadError {
        filename: "src/A.cbl".into(),
        message: "disk on fire".into(),
    };

    assert_eq!(error.to_string(), "Error collecting file 'src/A.cbl': disk on fire");
}

/// Test clone errors carry the git output
#[test]
fn test_cloneError_nonZeroExit_shouldIncludeOutput() {
    let error = CloneError::NonZeroExit {
        url: "https://github.com/acme/missing.git".into(),
        code: Some(128),
        stdout: String::new(),
        stderr: "repository not found".into(),
    };

    let message = PipelineError::from(error).to_string();

    assert!(message.contains("missing.git"));
    assert!(message.contains("128"));
    assert!(message.contains("repository not found"));
}

/// Test conversion into the application error
#[test]
fn test_appError_fromPipelineError_shouldWrap() {
    let error: AppError = PipelineError::Container("bad header".into()).into();

    assert!(matches!(error, AppError::Pipeline(_)));
    assert!(error.to_string().contains("bad header"));
}
