/*!
 * Pipeline orchestrator for coordinating the migration stages.
 *
 * One run goes through these phases, sequentially:
 * 1. Collecting: classify and load every file of the input
 * 2. Analysis: documents one by one, then all COBOL sources together
 * 3. Transcription: each COBOL source, when a language was requested
 * 4. Guides: each successful transcription
 * 5. Packaging: reports and migrated files into one ZIP
 *
 * Per-file failures become unit statuses. Only container and packaging
 * failures abort a run.
 */

use std::sync::Arc;
use std::time::Instant;

use log::info;

use crate::errors::PipelineError;
use crate::language_utils::{TargetLanguage, default_languages};
use crate::packaging::{InputKind, PackageOptions, PackagedOutput, ReportFormat, package_results};
use crate::pipeline::analysis_pass::AnalysisPass;
use crate::pipeline::guide_pass::GuidePass;
use crate::pipeline::loader::collect;
use crate::pipeline::planner::plan_transcription;
use crate::pipeline::transcription_pass::TranscriptionPass;
use crate::pipeline::units::{AnalysisUnit, RunResult};
use crate::providers::{GenerationRequest, Provider, TaskKind};
use crate::sources::FileSource;

/// Configuration for the migration pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Model identifier passed to the provider
    pub model: String,

    /// Output token limit for document and program analysis
    pub analysis_max_tokens: u32,

    /// Output token limit for transcriptions
    pub transcription_max_tokens: u32,

    /// Output token limit for integration guides
    pub guide_max_tokens: u32,

    /// Sampling temperature, provider default when absent
    pub temperature: Option<f32>,

    /// Languages COBOL can be migrated to
    pub languages: Vec<TargetLanguage>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash-lite".to_string(),
            analysis_max_tokens: 8192,
            transcription_max_tokens: 8192,
            guide_max_tokens: 8192,
            temperature: None,
            languages: default_languages(),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration for the given model.
    pub fn new(model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..Default::default()
        }
    }

    /// Set all token limits.
    pub fn with_token_limits(mut self, analysis: u32, transcription: u32, guide: u32) -> Self {
        self.analysis_max_tokens = analysis;
        self.transcription_max_tokens = transcription;
        self.guide_max_tokens = guide;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    /// Replace the language table.
    pub fn with_languages(mut self, languages: Vec<TargetLanguage>) -> Self {
        self.languages = languages;
        self
    }

    /// Start a request with this configuration's model and temperature
    pub fn request(&self, task: TaskKind, subject: impl Into<String>, max_output_tokens: u32) -> GenerationRequest {
        let request = GenerationRequest::new(task, subject, self.model.clone(), max_output_tokens);
        match self.temperature {
            Some(temperature) => request.temperature(temperature),
            None => request,
        }
    }
}

/// Phases of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Collecting,
    Analysis,
    Transcription,
    Guides,
    Packaging,
    Done,
}

/// Progress information during pipeline execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineProgress {
    /// Current phase
    pub phase: PipelinePhase,

    /// Units finished in this phase
    pub completed: usize,

    /// Units expected in this phase
    pub total: usize,

    /// Current status message
    pub message: String,
}

impl PipelineProgress {
    /// Progress within the current phase (0.0 - 1.0)
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f32 / self.total as f32
        }
    }
}

/// Callback receiving progress updates
pub type ProgressCallback = Arc<dyn Fn(PipelineProgress) + Send + Sync>;

fn notify(progress: &Option<ProgressCallback>, phase: PipelinePhase, completed: usize, total: usize, message: String) {
    if let Some(callback) = progress {
        callback(PipelineProgress {
            phase,
            completed,
            total,
            message,
        });
    }
}

/// Per-run parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Requested target language, validated against the table
    pub target_language: Option<String>,
    /// Marks outputs as reprocessed
    pub reprocess: bool,
    pub input_kind: InputKind,
    pub report_format: ReportFormat,
}

impl RunRequest {
    pub fn new(input_kind: InputKind) -> Self {
        Self {
            target_language: None,
            reprocess: false,
            input_kind,
            report_format: ReportFormat::default(),
        }
    }

    pub fn with_target_language(mut self, language: Option<String>) -> Self {
        self.target_language = language;
        self
    }

    pub fn with_reprocess(mut self, reprocess: bool) -> Self {
        self.reprocess = reprocess;
        self
    }

    pub fn with_report_format(mut self, format: ReportFormat) -> Self {
        self.report_format = format;
        self
    }
}

/// The migration pipeline orchestrator.
#[derive(Debug, Clone)]
pub struct MigrationPipeline {
    config: PipelineConfig,
    analysis_pass: AnalysisPass,
    transcription_pass: TranscriptionPass,
    guide_pass: GuidePass,
}

impl MigrationPipeline {
    /// Create a new pipeline with the given provider and configuration.
    pub fn new(provider: Arc<dyn Provider>, config: PipelineConfig) -> Self {
        Self {
            analysis_pass: AnalysisPass::new(provider.clone(), config.clone()),
            transcription_pass: TranscriptionPass::new(provider.clone(), config.clone()),
            guide_pass: GuidePass::new(provider, config.clone()),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage over `source` and return the collected units.
    ///
    /// # Returns
    /// * `Err(PipelineError::Container)` if the source cannot be enumerated
    pub async fn run(
        &self,
        source: &mut dyn FileSource,
        target_language: Option<&str>,
        progress: Option<ProgressCallback>,
    ) -> Result<RunResult, PipelineError> {
        let start_time = Instant::now();
        let outcome = plan_transcription(target_language, &self.config.languages);

        notify(&progress, PipelinePhase::Collecting, 0, 1, format!("Collecting files from {}", source.label()));
        let collection = collect(source)?;
        notify(&progress, PipelinePhase::Collecting, 1, 1, format!("{} files collected", collection.processed_file_count));

        let mut result = RunResult {
            processed_file_count: collection.processed_file_count,
            target_language: outcome.plan.language().map(str::to_string),
            language_notice: outcome.notice,
            ..Default::default()
        };
        result
            .analyses
            .extend(collection.load_failures.iter().map(AnalysisUnit::load_failure));

        // Analysis
        let analysis_total = collection.documents.len() + usize::from(!collection.group_sources.is_empty());
        let mut done = 0;
        notify(&progress, PipelinePhase::Analysis, done, analysis_total, "Starting analysis".to_string());
        for document in &collection.documents {
            result.analyses.push(self.analysis_pass.analyze_document(document).await);
            done += 1;
            notify(&progress, PipelinePhase::Analysis, done, analysis_total, format!("Analysed {}", document.filename()));
        }
        if let Some(unit) = self.analysis_pass.analyze_program(&collection.group_sources).await {
            result.analyses.push(unit);
            done += 1;
            notify(&progress, PipelinePhase::Analysis, done, analysis_total, "Analysed COBOL program".to_string());
        }

        // Transcription
        let source_total = collection.group_sources.len();
        notify(&progress, PipelinePhase::Transcription, 0, source_total, "Starting transcription".to_string());
        for (i, cobol) in collection.group_sources.iter().enumerate() {
            let unit = self.transcription_pass.transcribe(cobol, &outcome.plan).await;
            result.transcriptions.push(unit);
            notify(&progress, PipelinePhase::Transcription, i + 1, source_total, format!("Transcribed {}", cobol.filename()));
        }

        // Guides
        notify(&progress, PipelinePhase::Guides, 0, source_total, "Starting application guides".to_string());
        for (i, transcription) in result.transcriptions.iter().enumerate() {
            let guide = self.guide_pass.generate(transcription).await;
            result.guides.push(guide);
            notify(&progress, PipelinePhase::Guides, i + 1, source_total, format!("Guide for {}", transcription.filename));
        }

        info!("Pipeline finished in {:.2}s: {}", start_time.elapsed().as_secs_f32(), result.summary());
        Ok(result)
    }

    /// Run the pipeline and package the results.
    pub async fn process(
        &self,
        source: &mut dyn FileSource,
        request: &RunRequest,
        progress: Option<ProgressCallback>,
    ) -> Result<(RunResult, PackagedOutput), PipelineError> {
        let label = source.label().to_string();
        let result = self.run(source, request.target_language.as_deref(), progress.clone()).await?;

        notify(&progress, PipelinePhase::Packaging, 0, 1, "Packaging results".to_string());
        let output = package_results(
            &result,
            &PackageOptions {
                input_label: label,
                input_kind: request.input_kind,
                reprocess: request.reprocess,
                report_format: request.report_format,
            },
        )?;
        notify(&progress, PipelinePhase::Done, 1, 1, output.archive_name.clone());

        Ok((result, output))
    }
}
