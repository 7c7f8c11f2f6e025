/*!
 * Analysis stage.
 *
 * Documents are analysed one LLM call each. All COBOL sources are
 * concatenated with file markers and analysed together in a single call,
 * which yields exactly one combined unit.
 */

use std::sync::Arc;

use log::info;

use crate::pipeline::loader::{LoadedContent, LoadedFile};
use crate::pipeline::orchestrator::PipelineConfig;
use crate::pipeline::prompts::{PromptTemplate, combine_sources};
use crate::pipeline::response::interpret;
use crate::pipeline::units::{AnalysisScope, AnalysisUnit, combined_unit_name};
use crate::providers::{ContentPart, GenerationRequest, Provider, TaskKind};

/// Runs document and program analysis
#[derive(Debug, Clone)]
pub struct AnalysisPass {
    provider: Arc<dyn Provider>,
    config: PipelineConfig,
}

impl AnalysisPass {
    pub fn new(provider: Arc<dyn Provider>, config: PipelineConfig) -> Self {
        Self { provider, config }
    }

    /// Build the request for one document.
    ///
    /// Text documents are embedded in the prompt. PDFs send the prompt with
    /// empty content, followed by the raw bytes.
    pub fn document_request(&self, document: &LoadedFile) -> GenerationRequest {
        let template = PromptTemplate::document_analysis();
        let request = self.config.request(
            TaskKind::DocumentAnalysis,
            document.filename(),
            self.config.analysis_max_tokens,
        );

        match &document.content {
            LoadedContent::Text { text, .. } => {
                request.part(ContentPart::text(template.render(&[("file_content", text)])))
            }
            LoadedContent::Binary { bytes, mime_type } => request
                .part(ContentPart::text(template.render(&[("file_content", "")])))
                .part(ContentPart::blob(mime_type.clone(), bytes.clone())),
        }
    }

    /// Build the combined request for every COBOL source
    pub fn program_request(&self, sources: &[LoadedFile]) -> GenerationRequest {
        let combined = combine_sources(sources.iter().map(|s| (s.filename(), s.text())));
        let prompt = PromptTemplate::program_analysis().render(&[("combined_cobol_content", &combined)]);

        self.config
            .request(
                TaskKind::ProgramAnalysis,
                combined_unit_name(sources.len()),
                self.config.analysis_max_tokens,
            )
            .part(ContentPart::text(prompt))
    }

    /// Analyse a single document
    pub async fn analyze_document(&self, document: &LoadedFile) -> AnalysisUnit {
        info!("Analysing document {}", document.filename());
        let outcome = self.provider.generate(self.document_request(document)).await;
        let interpreted = interpret(outcome, TaskKind::DocumentAnalysis, document.filename());

        AnalysisUnit {
            filename: document.filename().to_string(),
            members: vec![document.filename().to_string()],
            scope: AnalysisScope::Document,
            status: interpreted.status,
            text: interpreted.text,
        }
    }

    /// Analyse all COBOL sources together; `None` when there are none
    pub async fn analyze_program(&self, sources: &[LoadedFile]) -> Option<AnalysisUnit> {
        if sources.is_empty() {
            info!("No COBOL files found for combined analysis");
            return None;
        }

        let name = combined_unit_name(sources.len());
        info!("Analysing {} COBOL files together", sources.len());
        let outcome = self.provider.generate(self.program_request(sources)).await;
        let interpreted = interpret(outcome, TaskKind::ProgramAnalysis, &name);

        Some(AnalysisUnit {
            filename: name,
            members: sources.iter().map(|s| s.filename().to_string()).collect(),
            scope: AnalysisScope::Program,
            status: interpreted.status,
            text: interpreted.text,
        })
    }
}
