/*!
 * Tests for provider response interpretation and code extraction
 */

use cobmig::errors::ProviderError;
use cobmig::pipeline::response::{extract_code, interpret};
use cobmig::pipeline::UnitStatus;
use cobmig::providers::{Candidate, GenerationResponse, TaskKind};

/// Test that the first fenced block wins and is trimmed
#[test]
fn test_extractCode_withSeveralBlocks_shouldTakeFirst() {
    let response = "Intro\n```java\n  public class A {}  \n```\nthen\n```\nsecond\n```";

    assert_eq!(extract_code(response), "public class A {}");
}

/// Test that an unfenced response is returned trimmed
#[test]
fn test_extractCode_withoutFence_shouldReturnTrimmedResponse() {
    assert_eq!(extract_code("\n  print('hi')\n\n"), "print('hi')");
}

/// Test that language tags with symbols are accepted
#[test]
fn test_extractCode_withSymbolTag_shouldStripTag() {
    assert_eq!(extract_code("```c#\nclass A {}\n```"), "class A {}");
    assert_eq!(extract_code("```c++\nint main() {}\n```"), "int main() {}");
}

/// Test that empty primary text falls through to candidates
#[test]
fn test_interpret_withEmptyTextAndCandidates_shouldUseCandidates() {
    let response = GenerationResponse {
        text: Some(String::new()),
        candidates: vec![Candidate::with_text("first"), Candidate::with_text("second")],
        prompt_feedback: None,
    };

    let result = interpret(Ok(Some(response)), TaskKind::DocumentAnalysis, "notes.txt");

    assert_eq!(result.status, UnitStatus::OkWithCaveats);
    assert_eq!(result.text, "first second");
}

/// Test that a failed call becomes an exception status naming the file
#[test]
fn test_interpret_withProviderError_shouldBeException() {
    let error = ProviderError::ConnectionError("connection refused".to_string());

    let result = interpret(Err(error), TaskKind::Transcription, "PAYROLL.cbl");

    assert!(matches!(result.status, UnitStatus::Exception { .. }));
    assert!(result.text.contains("Transcription for File: PAYROLL.cbl"));
    assert!(result.text.contains("connection refused"));
}

/// Test that a null response is an error status
#[test]
fn test_interpret_withNullResponse_shouldBeError() {
    let result = interpret(Ok(None), TaskKind::IntegrationGuide, "PAYROLL.cbl");

    assert_eq!(
        result.status,
        UnitStatus::Error {
            detail: "null response".to_string()
        }
    );
    assert!(result.text.contains("Application Guide for File: PAYROLL.cbl"));
}
