//! File classification by extension.

/// Extensions analysed one file at a time
pub const DOCUMENT_EXTENSIONS: [&str; 2] = [".pdf", ".txt"];

/// Extensions treated as COBOL sources
pub const COBOL_EXTENSIONS: [&str; 2] = [".cbl", ".cob"];

/// What the pipeline does with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    /// COBOL source, analysed jointly and optionally migrated
    GroupSource,
    /// Document analysed on its own
    IndividualDocument,
    /// Not processed, produces no record
    Ignored,
}

/// A classified file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessableFile {
    /// Path inside the container, `/` separated
    pub filename: String,
    /// Lowercase extension with a leading dot, empty if none
    pub extension: String,
    pub role: FileRole,
}

impl ProcessableFile {
    pub fn is_pdf(&self) -> bool {
        self.extension == ".pdf"
    }
}

/// Lowercased text after the last `.`, prefixed with `.`; empty when there is no `.`
pub fn extension_of(filename: &str) -> String {
    match filename.rfind('.') {
        Some(idx) => format!(".{}", filename[idx + 1..].to_lowercase()),
        None => String::new(),
    }
}

/// Role for an extension as returned by `extension_of`
pub fn role_for_extension(extension: &str) -> FileRole {
    if COBOL_EXTENSIONS.contains(&extension) {
        FileRole::GroupSource
    } else if DOCUMENT_EXTENSIONS.contains(&extension) {
        FileRole::IndividualDocument
    } else {
        FileRole::Ignored
    }
}

/// Classify one container entry. Directory entries yield `None`.
pub fn classify(filename: &str, is_dir: bool) -> Option<ProcessableFile> {
    if is_dir {
        return None;
    }

    let extension = extension_of(filename);
    let role = role_for_extension(&extension);
    Some(ProcessableFile {
        filename: filename.to_string(),
        extension,
        role,
    })
}
