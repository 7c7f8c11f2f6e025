/*!
 * Tests for output naming and report construction
 */

use cobmig::packaging::report::{analysis_report, Block, TextStyle};
use cobmig::packaging::{
    analysis_report_name, guide_document_name, output_archive_name, text, InputKind, ReportFormat,
};
use cobmig::pipeline::units::{AnalysisScope, AnalysisUnit};
use cobmig::pipeline::{RunResult, UnitStatus};

fn analysis(filename: &str, status: UnitStatus, text: &str) -> AnalysisUnit {
    AnalysisUnit {
        filename: filename.to_string(),
        members: vec![filename.to_string()],
        scope: AnalysisScope::Document,
        status,
        text: text.to_string(),
    }
}

/// Test report file names for both formats
#[test]
fn test_reportNames_shouldFollowFormatAndReprocess() {
    assert_eq!(analysis_report_name("legacy", false, ReportFormat::Pdf), "analysis_summary_legacy.pdf");
    assert_eq!(
        analysis_report_name("legacy", true, ReportFormat::Text),
        "analysis_summary_legacy_reprocessed.txt"
    );
    assert_eq!(
        guide_document_name(Some("Python"), true, ReportFormat::Pdf),
        "application_guide_all_migrated_code_to_Python_reprocessed.pdf"
    );
}

/// Test archive names keep uppercase extensions intact when not reprocessing
#[test]
fn test_outputArchiveName_withUppercaseZip_shouldKeepLabel() {
    assert_eq!(output_archive_name(InputKind::Archive, "LEGACY.ZIP", false), "migration_results_LEGACY.ZIP");
    assert_eq!(
        output_archive_name(InputKind::Archive, "LEGACY.ZIP", true),
        "migration_results_LEGACY_reprocessed.zip"
    );
}

/// Test that failed analyses are styled as errors
#[test]
fn test_analysisReport_shouldStyleFailures() {
    let result = RunResult {
        analyses: vec![
            analysis("notes.txt", UnitStatus::Ok, "Looks fine"),
            analysis("design.pdf", UnitStatus::Blocked { reason: "SAFETY".into() }, "blocked"),
        ],
        processed_file_count: 2,
        ..Default::default()
    };

    let report = analysis_report(&result, "legacy", false);

    assert_eq!(report.title, "Content Analysis: legacy");
    assert_eq!(
        report.blocks[0],
        Block::Heading {
            text: "File: notes.txt (OK)".to_string(),
            level: 2
        }
    );
    assert_eq!(
        report.blocks[3],
        Block::Paragraph {
            text: "blocked".to_string(),
            style: TextStyle::Error
        }
    );
}

/// Test text rendering of a full report
#[test]
fn test_textRender_withFailure_shouldPrefixError() {
    let result = RunResult {
        analyses: vec![analysis("design.pdf", UnitStatus::Error { detail: "null response".into() }, "nothing")],
        ..Default::default()
    };

    let rendered = String::from_utf8(text::render(&analysis_report(&result, "legacy", false))).unwrap();

    assert!(rendered.contains("File: design.pdf (Error: null response)"));
    assert!(rendered.contains("[ERROR] nothing"));
}
