/*!
 * Content loading and input collection.
 *
 * Collection walks a `FileSource` once, classifies every entry and loads the
 * processable ones. Everything is materialized here, before any LLM call.
 */

use std::io;

use log::{debug, info, warn};

use crate::errors::{LoadError, PipelineError};
use crate::pipeline::classifier::{FileRole, ProcessableFile, classify};
use crate::sources::FileSource;

/// Mime type for PDF documents
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Encoding a text file was decoded with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
}

/// Loaded file content
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedContent {
    /// Raw bytes sent as-is (PDF)
    Binary { bytes: Vec<u8>, mime_type: String },
    /// Decoded text
    Text { text: String, encoding: TextEncoding },
}

impl LoadedContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::Binary { .. } => None,
        }
    }
}

/// A classified file with its content
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedFile {
    pub file: ProcessableFile,
    pub content: LoadedContent,
}

impl LoadedFile {
    pub fn filename(&self) -> &str {
        &self.file.filename
    }

    /// Text content; empty for binary content
    pub fn text(&self) -> &str {
        self.content.as_text().unwrap_or_default()
    }
}

/// Decode as UTF-8, falling back to Latin-1 which accepts any byte sequence
pub fn decode_text(bytes: &[u8]) -> (String, TextEncoding) {
    match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), TextEncoding::Utf8),
        Err(_) => (bytes.iter().map(|&b| b as char).collect(), TextEncoding::Latin1),
    }
}

/// Turn the result of reading a file into its loaded content
pub fn load_content(file: &ProcessableFile, read: io::Result<Vec<u8>>) -> Result<LoadedContent, LoadError> {
    let bytes = read.map_err(|e| LoadError {
        filename: file.filename.clone(),
        message: e.to_string(),
    })?;

    if file.is_pdf() {
        return Ok(LoadedContent::Binary {
            bytes,
            mime_type: PDF_MIME_TYPE.to_string(),
        });
    }

    let (text, encoding) = decode_text(&bytes);
    if encoding == TextEncoding::Latin1 {
        warn!("Decoded '{}' using latin-1", file.filename);
    }
    Ok(LoadedContent::Text { text, encoding })
}

/// Everything collected from one input
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Loaded COBOL sources, in container order
    pub group_sources: Vec<LoadedFile>,
    /// Loaded documents, in container order
    pub documents: Vec<LoadedFile>,
    /// Files that failed to load, in container order
    pub load_failures: Vec<LoadError>,
    /// Files with a processable extension, including load failures
    pub processed_file_count: usize,
}

/// Classify and load every entry of `source`
///
/// # Returns
/// * `Err(PipelineError::Container)` if the source cannot be enumerated
pub fn collect(source: &mut dyn FileSource) -> Result<Collection, PipelineError> {
    let entries = source.entries()?;
    let mut collection = Collection::default();

    info!("Collecting files from '{}'", source.label());

    for entry in &entries {
        let Some(file) = classify(&entry.name, entry.is_dir) else {
            continue;
        };
        if file.role == FileRole::Ignored {
            debug!("Ignoring file with unsupported extension: {}", file.filename);
            continue;
        }

        collection.processed_file_count += 1;
        match load_content(&file, source.read(entry)) {
            Ok(content) => {
                debug!("Collected {:?} file: {}", file.role, file.filename);
                let loaded = LoadedFile { file, content };
                match loaded.file.role {
                    FileRole::GroupSource => collection.group_sources.push(loaded),
                    _ => collection.documents.push(loaded),
                }
            }
            Err(e) => {
                warn!("{}", e);
                collection.load_failures.push(e);
            }
        }
    }

    info!(
        "Collected {} COBOL sources, {} documents, {} load failures",
        collection.group_sources.len(),
        collection.documents.len(),
        collection.load_failures.len()
    );

    Ok(collection)
}
