/*!
 * # cobmig - COBOL analysis and migration with AI
 *
 * A Rust library that analyses the contents of a code bundle with an LLM,
 * migrates its COBOL sources to a target language, writes integration guides
 * for the migrated code, and packages everything into one ZIP archive.
 *
 * ## Features
 *
 * - Inputs: ZIP archives, local directories, GitHub repositories (shallow clone)
 * - Analysis of PDF and text documents, one call per document
 * - Joint analysis of all COBOL sources in one call
 * - Per-source migration to a configurable target language
 * - Integration guides for every successful migration
 * - PDF or plain-text reports
 * - Providers:
 *   - Google Gemini (default)
 *   - Anthropic API
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `sources`: Input containers behind the `FileSource` trait
 * - `pipeline`: Classification, loading and the LLM stages:
 *   - `pipeline::analysis_pass`: document and program analysis
 *   - `pipeline::transcription_pass`: COBOL migration
 *   - `pipeline::guide_pass`: integration guides
 *   - `pipeline::orchestrator`: runs the stages in order
 * - `packaging`: Reports and the output archive
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: Target language table
 * - `providers`: Client implementations for the LLM providers
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod packaging;
pub mod pipeline;
pub mod providers;
pub mod sources;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunOptions, RunOutcome};
pub use errors::{AppError, CloneError, LoadError, PipelineError, ProviderError};
pub use language_utils::{TargetLanguage, default_languages, find_language};
pub use packaging::{InputKind, PackagedOutput, ReportFormat, package_results};
pub use pipeline::{MigrationPipeline, PipelineConfig, RunRequest, RunResult, UnitStatus};
pub use sources::{DirectorySource, FileSource, ZipSource};
