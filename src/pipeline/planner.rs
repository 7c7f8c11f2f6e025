//! Decides whether COBOL sources get migrated, and to what.

use log::{info, warn};

use crate::language_utils::{TargetLanguage, find_language, language_names};

/// Transcription decision for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptionPlan {
    NotRequested,
    Requested {
        /// Canonical language name
        language: String,
        /// Output extension with a leading dot
        extension: String,
    },
}

impl TranscriptionPlan {
    pub fn is_requested(&self) -> bool {
        matches!(self, Self::Requested { .. })
    }

    pub fn language(&self) -> Option<&str> {
        match self {
            Self::Requested { language, .. } => Some(language),
            Self::NotRequested => None,
        }
    }
}

/// A plan plus the notice to surface when the input was ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    pub plan: TranscriptionPlan,
    pub notice: Option<String>,
}

/// Resolve the requested target language against the table.
///
/// Absent or blank input means no transcription. Unknown input is logged,
/// reported through `notice`, and otherwise treated as absent.
pub fn plan_transcription(requested: Option<&str>, languages: &[TargetLanguage]) -> PlanOutcome {
    let Some(input) = requested.map(str::trim).filter(|s| !s.is_empty()) else {
        info!("No target language selected, COBOL sources will be analysed only");
        return PlanOutcome {
            plan: TranscriptionPlan::NotRequested,
            notice: None,
        };
    };

    match find_language(languages, input) {
        Some(lang) => {
            info!("Transcription requested for COBOL to {}", lang.name);
            PlanOutcome {
                plan: TranscriptionPlan::Requested {
                    language: lang.name.clone(),
                    extension: lang.output_extension().to_string(),
                },
                notice: None,
            }
        }
        None => {
            let notice = format!(
                "Invalid target language '{}'. COBOL sources were analysed only. Valid options: {}",
                input,
                language_names(languages).join(", ")
            );
            warn!("{}", notice);
            PlanOutcome {
                plan: TranscriptionPlan::NotRequested,
                notice: Some(notice),
            }
        }
    }
}
