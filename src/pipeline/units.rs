/*!
 * Result units produced by the pipeline stages.
 *
 * Each stage emits one unit per item it handled. A unit pairs a closed
 * `UnitStatus` with the text to show for it, so the packager never has to
 * guess success from string prefixes.
 */

use std::fmt;

use crate::errors::LoadError;

/// Outcome of one unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitStatus {
    /// Primary text was returned
    Ok,
    /// No primary text, but candidate texts were usable
    OkWithCaveats,
    /// The service refused the prompt or response
    Blocked { reason: String },
    /// The service answered with nothing usable
    Error { detail: String },
    /// The call itself failed
    Exception { message: String },
    /// The unit was deliberately not produced
    Omitted { reason: String },
    /// The input file could not be read
    LoadError { message: String },
}

impl UnitStatus {
    /// Whether the unit carries a usable result
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok | Self::OkWithCaveats)
    }

    /// Whether the unit represents a failure (rendered with error styling)
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::Blocked { .. } | Self::Error { .. } | Self::Exception { .. } | Self::LoadError { .. }
        )
    }

    /// Whether the unit was skipped on purpose
    pub fn is_omitted(&self) -> bool {
        matches!(self, Self::Omitted { .. })
    }

    /// Short label used in report headings
    pub fn label(&self) -> String {
        match self {
            Self::Ok => "OK".to_string(),
            Self::OkWithCaveats => "OK (candidates)".to_string(),
            Self::Blocked { reason } => format!("Blocked: {}", reason),
            Self::Error { detail } => format!("Error: {}", detail),
            Self::Exception { .. } => "Exception".to_string(),
            Self::Omitted { reason } => format!("Omitted: {}", reason),
            Self::LoadError { .. } => "Collection Error".to_string(),
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// What an analysis unit covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisScope {
    /// A single document
    Document,
    /// Every COBOL source of the input, analysed together
    Program,
    /// A file that failed to load
    LoadFailure,
}

/// Analysis of one document, of the whole COBOL program, or a load failure
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisUnit {
    /// Display name: the document path, or the combined unit name
    pub filename: String,
    /// Source files covered, in input order
    pub members: Vec<String>,
    pub scope: AnalysisScope,
    pub status: UnitStatus,
    pub text: String,
}

impl AnalysisUnit {
    /// Record a file that failed to load; the text is the error message verbatim
    pub fn load_failure(error: &LoadError) -> Self {
        let message = error.to_string();
        Self {
            filename: error.filename.clone(),
            members: vec![error.filename.clone()],
            scope: AnalysisScope::LoadFailure,
            status: UnitStatus::LoadError {
                message: error.message.clone(),
            },
            text: message,
        }
    }
}

/// Name of the combined program analysis unit
pub fn combined_unit_name(member_count: usize) -> String {
    format!("Combined_COBOL_Program_Analysis_({}_files).txt", member_count)
}

/// Migration of one COBOL source
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionUnit {
    /// Source path inside the input
    pub filename: String,
    /// Canonical target language, absent when not requested
    pub target_language: Option<String>,
    /// Extension for the migrated file, `.txt` when not requested
    pub target_extension: String,
    pub status: UnitStatus,
    /// Migrated code on success, otherwise the status explanation
    pub text: String,
}

/// Integration guide for one migrated source
#[derive(Debug, Clone, PartialEq)]
pub struct GuideUnit {
    /// Source path inside the input
    pub filename: String,
    pub target_language: Option<String>,
    pub status: UnitStatus,
    pub text: String,
}

/// Everything one pipeline run produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunResult {
    /// Load failures, then documents, then the combined unit
    pub analyses: Vec<AnalysisUnit>,
    /// One per loaded COBOL source, in input order
    pub transcriptions: Vec<TranscriptionUnit>,
    /// One per transcription unit, same order
    pub guides: Vec<GuideUnit>,
    /// Files with a recognized extension, including ones that failed to load
    pub processed_file_count: usize,
    /// Canonical target language when transcription was requested
    pub target_language: Option<String>,
    /// Set when the requested language was invalid and ignored
    pub language_notice: Option<String>,
}

impl RunResult {
    /// Whether at least one transcription succeeded
    pub fn has_ok_transcription(&self) -> bool {
        self.transcriptions.iter().any(|t| t.status.is_ok())
    }

    /// Number of units across all stages that ended in failure
    pub fn failure_count(&self) -> usize {
        self.analyses.iter().filter(|u| u.status.is_failure()).count()
            + self.transcriptions.iter().filter(|u| u.status.is_failure()).count()
            + self.guides.iter().filter(|u| u.status.is_failure()).count()
    }

    /// One-line description for logs and the CLI
    pub fn summary(&self) -> String {
        let ok_transcriptions = self.transcriptions.iter().filter(|t| t.status.is_ok()).count();
        let ok_guides = self.guides.iter().filter(|g| g.status.is_ok()).count();

        format!(
            "{} files | {} analyses | {}/{} transcriptions OK | {}/{} guides OK | {} failures",
            self.processed_file_count,
            self.analyses.len(),
            ok_transcriptions,
            self.transcriptions.len(),
            ok_guides,
            self.guides.len(),
            self.failure_count()
        )
    }
}
