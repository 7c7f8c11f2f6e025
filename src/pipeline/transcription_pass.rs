//! Transcription stage: one LLM call per COBOL source when a language was requested.

use std::sync::Arc;

use log::info;

use crate::pipeline::loader::LoadedFile;
use crate::pipeline::orchestrator::PipelineConfig;
use crate::pipeline::planner::TranscriptionPlan;
use crate::pipeline::prompts::PromptTemplate;
use crate::pipeline::response::{extract_code, interpret};
use crate::pipeline::units::{TranscriptionUnit, UnitStatus};
use crate::providers::{ContentPart, GenerationRequest, Provider, TaskKind};
use crate::language_utils::FALLBACK_EXTENSION;

/// Migrates COBOL sources to the planned language
#[derive(Debug, Clone)]
pub struct TranscriptionPass {
    provider: Arc<dyn Provider>,
    config: PipelineConfig,
}

impl TranscriptionPass {
    pub fn new(provider: Arc<dyn Provider>, config: PipelineConfig) -> Self {
        Self { provider, config }
    }

    pub fn request(&self, source: &LoadedFile, language: &str) -> GenerationRequest {
        let prompt =
            PromptTemplate::transcription().render(&[("target_language", language), ("file_content", source.text())]);

        self.config
            .request(TaskKind::Transcription, source.filename(), self.config.transcription_max_tokens)
            .part(ContentPart::text(prompt))
    }

    /// Produce the transcription unit for one source.
    ///
    /// Without a requested language the unit is `Omitted` and no call is made.
    pub async fn transcribe(&self, source: &LoadedFile, plan: &TranscriptionPlan) -> TranscriptionUnit {
        let (language, extension) = match plan {
            TranscriptionPlan::NotRequested => {
                return TranscriptionUnit {
                    filename: source.filename().to_string(),
                    target_language: None,
                    target_extension: FALLBACK_EXTENSION.to_string(),
                    status: UnitStatus::Omitted {
                        reason: "not requested".to_string(),
                    },
                    text: format!(
                        "Transcription for '{}' was omitted because no target language was selected.",
                        source.filename()
                    ),
                };
            }
            TranscriptionPlan::Requested { language, extension } => (language, extension),
        };

        info!("Transcribing {} to {}", source.filename(), language);
        let outcome = self.provider.generate(self.request(source, language)).await;
        let interpreted = interpret(outcome, TaskKind::Transcription, source.filename());

        let text = if interpreted.status.is_ok() {
            extract_code(&interpreted.text)
        } else {
            interpreted.text
        };

        TranscriptionUnit {
            filename: source.filename().to_string(),
            target_language: Some(language.clone()),
            target_extension: extension.clone(),
            status: interpreted.status,
            text,
        }
    }
}
