use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;
use crate::packaging::{InputKind, PackagedOutput};
use crate::pipeline::{MigrationPipeline, PipelineProgress, ProgressCallback, RunRequest, RunResult};
use crate::providers::Provider;
use crate::sources::{clone_repository, DirectorySource, FileSource, ZipSource};

// @module: Application controller for migration runs

/// Per-invocation options
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Requested target language, if any
    pub target_language: Option<String>,
    /// Mark outputs as reprocessed
    pub reprocess: bool,
    /// Where to write the result archive; the configured directory when absent
    pub output_dir: Option<PathBuf>,
    /// Hide the progress spinner
    pub quiet: bool,
}

/// What a finished run left behind
#[derive(Debug)]
pub struct RunOutcome {
    pub result: RunResult,
    pub output_path: PathBuf,
    pub entries: Vec<String>,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Provider client shared with the pipeline
    provider: Arc<dyn Provider>,
    // @field: Pipeline over the provider
    pipeline: MigrationPipeline,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let provider = config.build_provider();
        Ok(Self::with_provider(config, provider))
    }

    /// Create a controller around an existing provider client
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Self {
        let pipeline = MigrationPipeline::new(provider.clone(), config.pipeline_config());
        Self {
            config,
            provider,
            pipeline,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check that the active provider answers
    pub async fn test_connection(&self) -> Result<()> {
        self.provider
            .test_connection()
            .await
            .with_context(|| format!("Connection test failed for {}", self.config.provider.display_name()))
    }

    /// Process a ZIP archive on disk
    pub async fn run_archive(&self, input_file: PathBuf, options: &RunOptions) -> Result<RunOutcome> {
        if !FileManager::file_exists(&input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        if !FileManager::is_zip_file(&input_file) {
            return Err(anyhow!("Invalid file type. Only .zip files are allowed: {:?}", input_file));
        }

        let source = ZipSource::open(&input_file)?;
        self.execute(Box::new(source), InputKind::Archive, options).await
    }

    /// Process every file under a local directory
    pub async fn run_directory(&self, input_dir: PathBuf, options: &RunOptions) -> Result<RunOutcome> {
        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let source = DirectorySource::new(&input_dir);
        self.execute(Box::new(source), InputKind::Directory, options).await
    }

    /// Clone a GitHub repository and process its checkout
    pub async fn run_repository(&self, url: &str, options: &RunOptions) -> Result<RunOutcome> {
        let repository = clone_repository(url).await.map_err(PipelineError::from)?;

        // The checkout lives as long as `repository`
        let outcome = self
            .execute(Box::new(repository.source()), InputKind::Repository, options)
            .await;
        drop(repository);
        outcome
    }

    /// Run the pipeline on a background task and write its archive
    async fn execute(&self, source: Box<dyn FileSource>, kind: InputKind, options: &RunOptions) -> Result<RunOutcome> {
        let start_time = std::time::Instant::now();
        let label = source.label().to_string();

        info!(
            "cobmig: {} - {} on '{}'",
            self.config.provider.display_name(),
            self.config.get_model(),
            label
        );

        let request = RunRequest::new(kind)
            .with_target_language(options.target_language.clone())
            .with_reprocess(options.reprocess)
            .with_report_format(self.config.report_format);

        let spinner = Self::spinner(options.quiet);
        let callback: ProgressCallback = {
            let spinner = spinner.clone();
            Arc::new(move |progress: PipelineProgress| {
                spinner.set_message(format!(
                    "{:?} {}/{} {}",
                    progress.phase, progress.completed, progress.total, progress.message
                ));
            })
        };

        let pipeline = self.pipeline.clone();
        let handle = tokio::spawn(async move {
            let mut source = source;
            pipeline.process(source.as_mut(), &request, Some(callback)).await
        });

        let joined = handle.await.map_err(|e| PipelineError::Worker(e.to_string()));
        spinner.finish_and_clear();

        let (result, output) = match joined {
            Ok(Ok(done)) => done,
            Ok(Err(e)) | Err(e) => {
                error!("Processing '{}' failed: {}", label, e);
                return Err(e.into());
            }
        };

        let output_path = self.write_output(&output, options)?;

        if let Some(notice) = &result.language_notice {
            warn!("{}", notice);
        }
        info!("{}", result.summary());
        info!(
            "Results written to {:?} in {}",
            output_path,
            Self::format_duration(start_time.elapsed())
        );

        Ok(RunOutcome {
            result,
            output_path,
            entries: output.entries,
        })
    }

    fn write_output(&self, output: &PackagedOutput, options: &RunOptions) -> Result<PathBuf> {
        let output_dir = options
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.config.output_dir));
        FileManager::ensure_dir(&output_dir)?;

        let output_path = FileManager::output_path(&output_dir, &output.archive_name);
        if output_path.exists() {
            warn!("Overwriting existing output: {:?}", output_path);
        }
        FileManager::write_bytes(&output_path, &output.bytes)?;
        Ok(output_path)
    }

    fn spinner(quiet: bool) -> ProgressBar {
        if quiet {
            return ProgressBar::hidden();
        }

        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    // @returns: Human readable duration
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
