/*!
 * Integration tests for full pipeline runs.
 *
 * Every run uses the mock provider so the number and kind of LLM calls can
 * be asserted alongside the produced units.
 */

use std::sync::Arc;

use parking_lot::Mutex;

use cobmig::errors::PipelineError;
use cobmig::packaging::{InputKind, ReportFormat};
use cobmig::pipeline::units::AnalysisScope;
use cobmig::pipeline::{MigrationPipeline, PipelineConfig, PipelinePhase, PipelineProgress, RunRequest, UnitStatus};
use cobmig::providers::mock::{MockBehavior, MockProvider};
use cobmig::providers::TaskKind;
use cobmig::sources::ZipSource;

use crate::common::{
    init_test_logger, set_compression_method, zip_bytes, zip_entry_text, zip_source, ScriptedSource, SAMPLE_COBOL,
};

fn pipeline(provider: &MockProvider) -> MigrationPipeline {
    init_test_logger();
    MigrationPipeline::new(Arc::new(provider.clone()), PipelineConfig::default())
}

/// Two COBOL files migrated to Python
#[tokio::test]
async fn test_run_withTwoCobolFilesAndPython_shouldMigrateBoth() {
    let provider = MockProvider::working();
    let mut source = zip_source(
        "legacy.zip",
        &[("a.cob", SAMPLE_COBOL.as_bytes()), ("b.cbl", SAMPLE_COBOL.as_bytes())],
    );

    let result = pipeline(&provider).run(&mut source, Some("python"), None).await.unwrap();

    assert_eq!(result.processed_file_count, 2);
    assert_eq!(result.target_language.as_deref(), Some("Python"));

    assert_eq!(result.analyses.len(), 1);
    let combined = &result.analyses[0];
    assert_eq!(combined.scope, AnalysisScope::Program);
    assert_eq!(combined.filename, "Combined_COBOL_Program_Analysis_(2_files).txt");
    assert_eq!(combined.members, vec!["a.cob", "b.cbl"]);

    assert_eq!(result.transcriptions.len(), 2);
    for unit in &result.transcriptions {
        assert_eq!(unit.status, UnitStatus::Ok);
        assert_eq!(unit.target_extension, ".py");
        assert_eq!(unit.text, format!("// migrated from {}", unit.filename));
    }

    assert_eq!(result.guides.len(), 2);
    assert!(result.guides.iter().all(|g| g.status.is_ok()));

    assert_eq!(provider.requests_for(TaskKind::ProgramAnalysis).len(), 1);
    assert_eq!(provider.requests_for(TaskKind::Transcription).len(), 2);
    assert_eq!(provider.requests_for(TaskKind::IntegrationGuide).len(), 2);
}

/// The combined prompt carries every source between markers
#[tokio::test]
async fn test_run_combinedAnalysis_shouldIncludeEverySource() {
    let provider = MockProvider::working();
    let mut source = zip_source(
        "legacy.zip",
        &[("A.cbl", b"DISPLAY 'A'."), ("B.cbl", b"DISPLAY 'B'.")],
    );

    pipeline(&provider).run(&mut source, None, None).await.unwrap();

    let requests = provider.requests_for(TaskKind::ProgramAnalysis);
    assert_eq!(requests.len(), 1);
    let prompt = requests[0].prompt_text();
    assert!(prompt.contains("DISPLAY 'A'."));
    assert!(prompt.contains("DISPLAY 'B'."));
    assert!(prompt.find("A.cbl").unwrap() < prompt.find("B.cbl").unwrap());
}

/// A single PDF without a language
#[tokio::test]
async fn test_run_withPdfOnly_shouldAnalyseBinaryDocument() {
    let provider = MockProvider::working();
    let mut source = zip_source("docs.zip", &[("report.pdf", b"%PDF-1.7 \xFF\xFE")]);

    let result = pipeline(&provider).run(&mut source, None, None).await.unwrap();

    assert_eq!(result.processed_file_count, 1);
    assert_eq!(result.analyses.len(), 1);
    assert_eq!(result.analyses[0].scope, AnalysisScope::Document);
    assert!(result.analyses[0].status.is_ok());
    assert!(result.transcriptions.is_empty());
    assert!(result.guides.is_empty());

    let requests = provider.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].has_binary());
    assert_eq!(requests[0].task, TaskKind::DocumentAnalysis);
}

/// No language: every COBOL file is omitted and no transcription call is made
#[tokio::test]
async fn test_run_withoutLanguage_shouldOmitTranscriptions() {
    let provider = MockProvider::working();
    let mut source = zip_source(
        "legacy.zip",
        &[("A.cbl", SAMPLE_COBOL.as_bytes()), ("notes.txt", b"notes")],
    );

    let result = pipeline(&provider).run(&mut source, Some("   "), None).await.unwrap();

    assert_eq!(result.transcriptions.len(), 1);
    assert!(result.transcriptions[0].status.is_omitted());
    assert_eq!(result.guides.len(), 1);
    assert!(result.guides[0].status.is_omitted());
    assert!(result.language_notice.is_none());
    assert!(provider.requests_for(TaskKind::Transcription).is_empty());
    assert!(provider.requests_for(TaskKind::IntegrationGuide).is_empty());
}

/// An invalid language degrades to analysis only, with a notice
#[tokio::test]
async fn test_run_withInvalidLanguage_shouldAddNotice() {
    let provider = MockProvider::working();
    let mut source = zip_source("legacy.zip", &[("A.cbl", SAMPLE_COBOL.as_bytes())]);

    let result = pipeline(&provider).run(&mut source, Some("Klingon"), None).await.unwrap();

    assert!(result.target_language.is_none());
    let notice = result.language_notice.unwrap();
    assert!(notice.contains("Klingon"));
    assert!(result.transcriptions[0].status.is_omitted());
    assert!(provider.requests_for(TaskKind::Transcription).is_empty());
}

/// An unreadable file becomes a load failure and nothing else
#[tokio::test]
async fn test_run_withUnreadableCobol_shouldOnlyRecordLoadFailure() {
    let provider = MockProvider::working();
    let mut source = ScriptedSource::new("broken.zip").unreadable("BAD.cbl");

    let result = pipeline(&provider).run(&mut source, Some("Java"), None).await.unwrap();

    assert_eq!(result.processed_file_count, 1);
    assert_eq!(result.analyses.len(), 1);
    assert_eq!(result.analyses[0].scope, AnalysisScope::LoadFailure);
    assert!(matches!(result.analyses[0].status, UnitStatus::LoadError { .. }));
    assert!(result.transcriptions.is_empty());
    assert!(result.guides.is_empty());
    assert_eq!(provider.request_count(), 0);
}

/// Load failures come first, then documents, then the combined unit
#[tokio::test]
async fn test_run_withMixedInput_shouldOrderAnalyses() {
    let provider = MockProvider::working();
    let mut source = ScriptedSource::new("mixed.zip")
        .file("A.cbl", SAMPLE_COBOL.as_bytes())
        .file("readme.txt", b"readme")
        .unreadable("lost.pdf")
        .file("B.cob", SAMPLE_COBOL.as_bytes());

    let result = pipeline(&provider).run(&mut source, None, None).await.unwrap();

    let scopes: Vec<AnalysisScope> = result.analyses.iter().map(|a| a.scope).collect();
    assert_eq!(
        scopes,
        vec![AnalysisScope::LoadFailure, AnalysisScope::Document, AnalysisScope::Program]
    );
    assert_eq!(result.processed_file_count, 4);
}

/// A blocked transcription gets an omitted guide and no guide call
#[tokio::test]
async fn test_run_withBlockedTranscription_shouldOmitGuide() {
    let provider = MockProvider::working().with_task_behavior(TaskKind::Transcription, MockBehavior::Blocked);
    let mut source = zip_source("legacy.zip", &[("A.cbl", SAMPLE_COBOL.as_bytes())]);

    let result = pipeline(&provider).run(&mut source, Some("Go"), None).await.unwrap();

    let transcription = &result.transcriptions[0];
    assert_eq!(
        transcription.status,
        UnitStatus::Blocked {
            reason: "SAFETY".to_string()
        }
    );
    assert!(transcription.text.contains("HARM_CATEGORY_DANGEROUS_CONTENT: HIGH"));
    assert!(result.guides[0].status.is_omitted());
    assert!(provider.requests_for(TaskKind::IntegrationGuide).is_empty());
    assert!(!result.has_ok_transcription());
}

/// Failing calls are recorded per unit and do not stop the run
#[tokio::test]
async fn test_run_withFailingProvider_shouldRecordExceptions() {
    let provider = MockProvider::failing();
    let mut source = zip_source(
        "legacy.zip",
        &[("A.cbl", SAMPLE_COBOL.as_bytes()), ("notes.txt", b"notes")],
    );

    let result = pipeline(&provider).run(&mut source, Some("Java"), None).await.unwrap();

    assert!(matches!(result.analyses[0].status, UnitStatus::Exception { .. }));
    assert!(matches!(result.analyses[1].status, UnitStatus::Exception { .. }));
    assert!(matches!(result.transcriptions[0].status, UnitStatus::Exception { .. }));
    assert!(result.guides[0].status.is_omitted());
    assert_eq!(result.failure_count(), 3);
}

/// Candidate-only answers still count as successful transcriptions
#[tokio::test]
async fn test_run_withCandidatesOnly_shouldBeOkWithCaveats() {
    let provider = MockProvider::new(MockBehavior::CandidatesOnly);
    let mut source = zip_source("legacy.zip", &[("A.cbl", SAMPLE_COBOL.as_bytes())]);

    let result = pipeline(&provider).run(&mut source, Some("Java"), None).await.unwrap();

    assert_eq!(result.transcriptions[0].status, UnitStatus::OkWithCaveats);
    assert!(result.guides[0].status.is_ok());
}

/// Malformed input bytes abort before any call
#[tokio::test]
async fn test_zipSource_withMalformedBytes_shouldNotReachProvider() {
    let provider = MockProvider::working();

    let source = ZipSource::from_bytes("junk.zip", vec![0x50, 0x4B, 0x00]);

    assert!(matches!(source, Err(PipelineError::Container(_))));
    assert_eq!(provider.request_count(), 0);
}

/// Progress reaches every phase in order
#[tokio::test]
async fn test_run_withProgressCallback_shouldReportPhases() {
    let provider = MockProvider::working();
    let mut source = zip_source("legacy.zip", &[("A.cbl", SAMPLE_COBOL.as_bytes())]);
    let updates: Arc<Mutex<Vec<PipelineProgress>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = updates.clone();

    pipeline(&provider)
        .run(
            &mut source,
            Some("Java"),
            Some(Arc::new(move |p: PipelineProgress| sink.lock().push(p))),
        )
        .await
        .unwrap();

    let phases: Vec<PipelinePhase> = updates.lock().iter().map(|p| p.phase).collect();
    let first = |phase: PipelinePhase| phases.iter().position(|p| *p == phase).unwrap();
    assert!(first(PipelinePhase::Collecting) < first(PipelinePhase::Analysis));
    assert!(first(PipelinePhase::Analysis) < first(PipelinePhase::Transcription));
    assert!(first(PipelinePhase::Transcription) < first(PipelinePhase::Guides));
}

/// Entries the build cannot decompress fail per file, not per run
#[tokio::test]
async fn test_run_withUnsupportedCompression_shouldIsolateFailures() {
    let provider = MockProvider::working();
    let mut bytes = zip_bytes(&[
        ("a.cob", SAMPLE_COBOL.as_bytes()),
        ("logo.png", b"\x89PNG"),
        ("B.cbl", SAMPLE_COBOL.as_bytes()),
    ]);
    set_compression_method(&mut bytes, "logo.png", 12);
    set_compression_method(&mut bytes, "B.cbl", 12);
    let mut source = ZipSource::from_bytes("legacy.zip", bytes).unwrap();

    let result = pipeline(&provider).run(&mut source, Some("Java"), None).await.unwrap();

    assert_eq!(result.processed_file_count, 2);
    assert_eq!(result.analyses.len(), 2);
    assert_eq!(result.analyses[0].scope, AnalysisScope::LoadFailure);
    assert_eq!(result.analyses[0].filename, "B.cbl");
    assert!(matches!(result.analyses[0].status, UnitStatus::LoadError { .. }));
    assert_eq!(result.analyses[1].members, vec!["a.cob"]);
    assert_eq!(result.transcriptions.len(), 1);
    assert_eq!(result.transcriptions[0].filename, "a.cob");
    assert!(provider.requests().iter().all(|r| !r.prompt_text().contains("logo.png")));
}

/// Guides follow each file's own transcription outcome
#[tokio::test]
async fn test_process_withOneFailedTranscription_shouldGateGuidesPerFile() {
    // Requests: combined analysis, a.cbl, b.cbl (fails), guide for a.cbl
    let provider = MockProvider::intermittent(3);
    let mut source = zip_source(
        "legacy.zip",
        &[("a.cbl", SAMPLE_COBOL.as_bytes()), ("b.cbl", SAMPLE_COBOL.as_bytes())],
    );
    let request = RunRequest::new(InputKind::Archive)
        .with_target_language(Some("Java".to_string()))
        .with_report_format(ReportFormat::Text);

    let (result, output) = pipeline(&provider).process(&mut source, &request, None).await.unwrap();

    assert_eq!(result.transcriptions[0].status, UnitStatus::Ok);
    assert!(matches!(result.transcriptions[1].status, UnitStatus::Exception { .. }));
    assert_eq!(result.guides.len(), 2);
    assert_eq!(result.guides[0].status, UnitStatus::Ok);
    assert!(result.guides[1].status.is_omitted());
    assert_eq!(provider.requests_for(TaskKind::IntegrationGuide).len(), 1);
    assert_eq!(provider.requests_for(TaskKind::IntegrationGuide)[0].subject, "a.cbl");

    assert_eq!(
        output.entries,
        vec![
            "analysis_summary_legacy.txt",
            "a.java",
            "b_transcription_error.txt",
            "application_guide_all_migrated_code_to_Java.txt",
        ]
    );
    let error_text = zip_entry_text(&output.bytes, "b_transcription_error.txt").unwrap();
    assert!(error_text.contains("Simulated intermittent failure"));
}

/// Unusable response shapes become Error units and the run goes on
#[tokio::test]
async fn test_run_withUnusableResponses_shouldRecordErrorsAndContinue() {
    let provider = MockProvider::working()
        .with_task_behavior(TaskKind::DocumentAnalysis, MockBehavior::CandidatesWithoutText)
        .with_task_behavior(TaskKind::ProgramAnalysis, MockBehavior::Unexpected);
    let mut source = zip_source(
        "legacy.zip",
        &[("notes.txt", b"notes"), ("A.cbl", SAMPLE_COBOL.as_bytes())],
    );

    let result = pipeline(&provider).run(&mut source, Some("Go"), None).await.unwrap();

    assert_eq!(
        result.analyses[0].status,
        UnitStatus::Error {
            detail: "candidates without text".to_string()
        }
    );
    assert_eq!(
        result.analyses[1].status,
        UnitStatus::Error {
            detail: "unexpected response".to_string()
        }
    );
    assert_eq!(result.transcriptions[0].status, UnitStatus::Ok);
    assert_eq!(result.guides[0].status, UnitStatus::Ok);
}
