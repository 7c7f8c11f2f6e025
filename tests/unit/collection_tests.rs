/*!
 * Tests for file classification and content loading
 */

use cobmig::errors::PipelineError;
use cobmig::pipeline::classifier::{classify, FileRole};
use cobmig::pipeline::loader::{collect, decode_text, LoadedContent, TextEncoding, PDF_MIME_TYPE};
use cobmig::sources::ZipSource;

use crate::common::{zip_source, ScriptedSource, SAMPLE_COBOL};

/// Test that unknown extensions are never processed
#[test]
fn test_classify_withUnknownExtension_shouldBeIgnored() {
    for name in ["logo.png", "build.sh", "Makefile", "data.cpy"] {
        assert_eq!(classify(name, false).unwrap().role, FileRole::Ignored, "{}", name);
    }
}

/// Test that directory entries produce nothing
#[test]
fn test_classify_withDirectoryEntry_shouldReturnNone() {
    assert!(classify("programs/", true).is_none());
}

/// Test collection from an archive with mixed content
#[test]
fn test_collect_withMixedArchive_shouldSplitByRole() {
    let mut source = zip_source(
        "legacy.zip",
        &[
            ("docs/", b""),
            ("docs/notes.txt", b"Batch payroll notes"),
            ("docs/design.pdf", b"%PDF-1.4 binary"),
            ("src/PAYROLL.cbl", SAMPLE_COBOL.as_bytes()),
            ("src/TAX.COB", SAMPLE_COBOL.as_bytes()),
            ("img/logo.png", &[0x89, 0x50]),
        ],
    );

    let collection = collect(&mut source).unwrap();

    assert_eq!(collection.processed_file_count, 4);
    assert_eq!(collection.documents.len(), 2);
    assert_eq!(collection.group_sources.len(), 2);
    assert!(collection.load_failures.is_empty());

    let names: Vec<&str> = collection.group_sources.iter().map(|f| f.filename()).collect();
    assert_eq!(names, vec!["src/PAYROLL.cbl", "src/TAX.COB"]);

    let pdf = collection.documents.iter().find(|d| d.filename() == "docs/design.pdf").unwrap();
    match &pdf.content {
        LoadedContent::Binary { bytes, mime_type } => {
            assert_eq!(bytes, b"%PDF-1.4 binary");
            assert_eq!(mime_type, PDF_MIME_TYPE);
        }
        other => panic!("expected binary content, got {:?}", other),
    }
}

/// Test that an unreadable COBOL file is recorded as a load failure and still counted
#[test]
fn test_collect_withUnreadableFile_shouldRecordLoadFailure() {
    let mut source = ScriptedSource::new("broken.zip")
        .file("GOOD.cbl", SAMPLE_COBOL.as_bytes())
        .unreadable("BAD.cbl");

    let collection = collect(&mut source).unwrap();

    assert_eq!(collection.processed_file_count, 2);
    assert_eq!(collection.group_sources.len(), 1);
    assert_eq!(collection.load_failures.len(), 1);
    assert_eq!(collection.load_failures[0].filename, "BAD.cbl");
    assert!(collection.load_failures[0].to_string().starts_with("Error collecting file 'BAD.cbl'"));
}

/// Test that Latin-1 text is decoded rather than rejected
#[test]
fn test_decodeText_withLatin1Bytes_shouldDecodeEveryByte() {
    let bytes = b"MOVE 'CAF\xC9' TO WS-NAME";

    let (text, encoding) = decode_text(bytes);

    assert_eq!(encoding, TextEncoding::Latin1);
    assert_eq!(text, "MOVE 'CAFÉ' TO WS-NAME");
    assert_eq!(text.chars().count(), bytes.len());
}

/// Test that malformed archive bytes are a container error
#[test]
fn test_zipSource_withMalformedBytes_shouldFailWithContainerError() {
    let result = ZipSource::from_bytes("junk.zip", b"this is not a zip".to_vec());

    assert!(matches!(result, Err(PipelineError::Container(_))));
}
