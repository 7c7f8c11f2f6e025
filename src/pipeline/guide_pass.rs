//! Integration guide stage: one LLM call per successful transcription.

use std::sync::Arc;

use log::info;

use crate::pipeline::orchestrator::PipelineConfig;
use crate::pipeline::prompts::PromptTemplate;
use crate::pipeline::response::interpret;
use crate::pipeline::units::{GuideUnit, TranscriptionUnit, UnitStatus};
use crate::providers::{ContentPart, GenerationRequest, Provider, TaskKind};

/// Writes integration guides for migrated sources
#[derive(Debug, Clone)]
pub struct GuidePass {
    provider: Arc<dyn Provider>,
    config: PipelineConfig,
}

impl GuidePass {
    pub fn new(provider: Arc<dyn Provider>, config: PipelineConfig) -> Self {
        Self { provider, config }
    }

    pub fn request(&self, transcription: &TranscriptionUnit, language: &str) -> GenerationRequest {
        let prompt = PromptTemplate::integration_guide().render(&[
            ("target_language", language),
            ("migrated_code_content", &transcription.text),
        ]);

        self.config
            .request(TaskKind::IntegrationGuide, &transcription.filename, self.config.guide_max_tokens)
            .part(ContentPart::text(prompt))
    }

    /// Produce the guide unit for one transcription.
    ///
    /// Only OK transcriptions get a guide; anything else yields `Omitted`
    /// without calling the provider.
    pub async fn generate(&self, transcription: &TranscriptionUnit) -> GuideUnit {
        let language = match &transcription.target_language {
            Some(language) if transcription.status.is_ok() => language,
            _ => {
                return GuideUnit {
                    filename: transcription.filename.clone(),
                    target_language: transcription.target_language.clone(),
                    status: UnitStatus::Omitted {
                        reason: format!("transcription {}", transcription.status),
                    },
                    text: format!(
                        "Application guide for '{}' omitted due to transcription error or omission.",
                        transcription.filename
                    ),
                };
            }
        };

        info!("Generating application guide for {} ({})", transcription.filename, language);
        let outcome = self.provider.generate(self.request(transcription, language)).await;
        let interpreted = interpret(outcome, TaskKind::IntegrationGuide, &transcription.filename);

        GuideUnit {
            filename: transcription.filename.clone(),
            target_language: Some(language.clone()),
            status: interpreted.status,
            text: interpreted.text,
        }
    }
}
