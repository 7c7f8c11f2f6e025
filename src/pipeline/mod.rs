/*!
 * Migration pipeline.
 *
 * The pipeline processes an input container in stages:
 * 1. **Collection**: classify files by extension and load their content
 * 2. **Analysis**: per-document analysis plus one combined COBOL analysis
 * 3. **Transcription**: per-source COBOL migration to the target language
 * 4. **Guides**: per-source integration guide for successful migrations
 */

pub mod analysis_pass;
pub mod classifier;
pub mod guide_pass;
pub mod loader;
pub mod orchestrator;
pub mod planner;
pub mod prompts;
pub mod response;
pub mod transcription_pass;
pub mod units;

// Re-export types used externally
pub use orchestrator::{MigrationPipeline, PipelineConfig, PipelinePhase, PipelineProgress, ProgressCallback, RunRequest};
pub use units::{AnalysisScope, AnalysisUnit, GuideUnit, RunResult, TranscriptionUnit, UnitStatus};
