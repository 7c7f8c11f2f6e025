/*!
 * Result packaging.
 *
 * Turns a `RunResult` into the output ZIP:
 * - the analysis report (`analysis_summary_<base>.<ext>`)
 * - one migrated or error file per transcription unit
 * - the integration guide, when at least one transcription succeeded
 *
 * Reports are built once as `report::ReportDocument` and rendered to PDF or
 * plain text depending on `ReportFormat`.
 */

use std::collections::HashSet;
use std::fmt;
use std::io::{Cursor, Write};
use std::str::FromStr;

use anyhow::anyhow;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::PipelineError;
use crate::pipeline::units::{RunResult, TranscriptionUnit};

pub mod pdf;
pub mod report;
pub mod text;

pub use report::{Block, ReportDocument, TextStyle};

/// Suffix appended to output names when reprocessing
pub const REPROCESS_SUFFIX: &str = "_reprocessed";

/// Output format of the analysis report and the guide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Pdf,
    Text,
}

impl ReportFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "txt",
        }
    }

    /// Render a report in this format
    pub fn render(&self, report: &ReportDocument) -> Result<Vec<u8>, PipelineError> {
        match self {
            Self::Pdf => pdf::render(report),
            Self::Text => Ok(text::render(report)),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => write!(f, "pdf"),
            Self::Text => write!(f, "text"),
        }
    }
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(anyhow!("Invalid report format: {}", s)),
        }
    }
}

/// Where the input came from; decides the output archive name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Archive,
    Directory,
    Repository,
}

/// Packaging parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOptions {
    /// Input label: archive file name, directory or repository name
    pub input_label: String,
    pub input_kind: InputKind,
    pub reprocess: bool,
    pub report_format: ReportFormat,
}

/// The built output archive
#[derive(Debug, Clone)]
pub struct PackagedOutput {
    /// Suggested file name for the archive
    pub archive_name: String,
    /// Entry names, in archive order
    pub entries: Vec<String>,
    /// ZIP bytes
    pub bytes: Vec<u8>,
}

fn suffix(reprocess: bool) -> &'static str {
    if reprocess { REPROCESS_SUFFIX } else { "" }
}

/// Input label without a trailing `.zip` (any case)
pub fn base_name(label: &str) -> &str {
    let len = label.len();
    if len >= 4 && label.is_char_boundary(len - 4) && label[len - 4..].eq_ignore_ascii_case(".zip") {
        &label[..len - 4]
    } else {
        label
    }
}

/// `name` without the last extension of its final path component
fn strip_last_extension(name: &str) -> &str {
    let file_start = name.rfind('/').map(|i| i + 1).unwrap_or(0);
    match name[file_start..].rfind('.') {
        Some(dot) => &name[..file_start + dot],
        None => name,
    }
}

pub fn analysis_report_name(base: &str, reprocess: bool, format: ReportFormat) -> String {
    format!("analysis_summary_{}{}.{}", base, suffix(reprocess), format.extension())
}

pub fn guide_document_name(language: Option<&str>, reprocess: bool, format: ReportFormat) -> String {
    format!(
        "application_guide_all_migrated_code_to_{}{}.{}",
        language.unwrap_or("N_A"),
        suffix(reprocess),
        format.extension()
    )
}

/// Archive entry for a transcription unit: migrated code or the error text
pub fn transcription_file_name(unit: &TranscriptionUnit, reprocess: bool) -> String {
    let stem = strip_last_extension(&unit.filename);
    if unit.status.is_ok() && !unit.text.is_empty() {
        format!("{}{}", stem, unit.target_extension)
    } else {
        format!("{}_transcription_error{}.txt", stem, suffix(reprocess))
    }
}

/// Name of the output archive itself
pub fn output_archive_name(kind: InputKind, label: &str, reprocess: bool) -> String {
    match kind {
        InputKind::Archive if reprocess => format!("migration_results_{}{}.zip", base_name(label), REPROCESS_SUFFIX),
        InputKind::Archive if base_name(label).len() == label.len() => format!("migration_results_{}.zip", label),
        InputKind::Archive => format!("migration_results_{}", label),
        InputKind::Directory | InputKind::Repository => {
            format!("analysis_results_{}{}.zip", label, suffix(reprocess))
        }
    }
}

/// Return `name`, or `name` with `_<n>` before its extension if already used
pub fn unique_name(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }

    let stem = strip_last_extension(&name).to_string();
    let ext = name[stem.len()..].to_string();
    let mut n = 1;
    loop {
        let candidate = format!("{}_{}{}", stem, n, ext);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    used: HashSet<String>,
    entries: Vec<String>,
}

impl ArchiveBuilder {
    fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
            used: HashSet::new(),
            entries: Vec::new(),
        }
    }

    fn add(&mut self, name: String, data: &[u8]) -> Result<(), PipelineError> {
        let name = unique_name(name, &mut self.used);
        debug!("Adding '{}' ({} bytes) to output archive", name, data.len());
        self.writer
            .start_file(name.as_str(), self.options)
            .map_err(|e| PipelineError::Packaging(e.to_string()))?;
        self.writer
            .write_all(data)
            .map_err(|e| PipelineError::Packaging(e.to_string()))?;
        self.entries.push(name);
        Ok(())
    }

    fn finish(self) -> Result<(Vec<String>, Vec<u8>), PipelineError> {
        let cursor = self
            .writer
            .finish()
            .map_err(|e| PipelineError::Packaging(e.to_string()))?;
        Ok((self.entries, cursor.into_inner()))
    }
}

/// Build the output archive for a run
pub fn package_results(result: &RunResult, options: &PackageOptions) -> Result<PackagedOutput, PipelineError> {
    let base = match options.input_kind {
        InputKind::Archive => base_name(&options.input_label),
        InputKind::Directory | InputKind::Repository => options.input_label.as_str(),
    };
    let mut archive = ArchiveBuilder::new();

    let analysis = report::analysis_report(result, base, options.reprocess);
    archive.add(
        analysis_report_name(base, options.reprocess, options.report_format),
        &options.report_format.render(&analysis)?,
    )?;

    for unit in &result.transcriptions {
        archive.add(transcription_file_name(unit, options.reprocess), unit.text.as_bytes())?;
    }

    if let Some(guide) = report::guide_document(result, options.reprocess) {
        archive.add(
            guide_document_name(result.target_language.as_deref(), options.reprocess, options.report_format),
            &options.report_format.render(&guide)?,
        )?;
    }

    let (entries, bytes) = archive.finish()?;
    let archive_name = output_archive_name(options.input_kind, &options.input_label, options.reprocess);
    info!("Packaged {} entries into {} ({} bytes)", entries.len(), archive_name, bytes.len());

    Ok(PackagedOutput {
        archive_name,
        entries,
        bytes,
    })
}
