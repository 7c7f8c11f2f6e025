/*!
 * Renderer-independent report documents.
 *
 * The analysis report and the integration guide are built here as a flat
 * list of blocks; `pdf` and `text` turn the same document into bytes.
 */

use crate::pipeline::units::RunResult;

/// How a paragraph is styled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Body,
    /// Failure text, rendered red in PDFs
    Error,
}

/// One block of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Section heading; level 1 is the largest below the title
    Heading { text: String, level: u8 },
    Paragraph { text: String, style: TextStyle },
    PageBreak,
}

/// A titled sequence of blocks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub title: String,
    pub blocks: Vec<Block>,
}

impl ReportDocument {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    pub fn heading(&mut self, text: impl Into<String>, level: u8) {
        self.blocks.push(Block::Heading {
            text: text.into(),
            level,
        });
    }

    pub fn paragraph(&mut self, text: impl Into<String>, style: TextStyle) {
        self.blocks.push(Block::Paragraph {
            text: text.into(),
            style,
        });
    }

    pub fn page_break(&mut self) {
        self.blocks.push(Block::PageBreak);
    }
}

/// Message shown when no analysis unit exists
pub const NO_ANALYSIS_MESSAGE: &str = "No analysis results could be obtained.";

/// Introduction of the integration guide
pub const GUIDE_INTRO: &str =
    "This document contains step-by-step guides for integrating and applying the newly migrated code.";

fn title_suffix(reprocess: bool) -> &'static str {
    if reprocess { " (Reprocessed)" } else { "" }
}

/// Build the analysis report: one section per analysis unit
pub fn analysis_report(result: &RunResult, base_name: &str, reprocess: bool) -> ReportDocument {
    let mut doc = ReportDocument::new(format!("Content Analysis: {}{}", base_name, title_suffix(reprocess)));

    if let Some(notice) = &result.language_notice {
        doc.paragraph(notice.clone(), TextStyle::Error);
    }

    if result.analyses.is_empty() {
        doc.paragraph(NO_ANALYSIS_MESSAGE, TextStyle::Error);
        return doc;
    }

    for unit in &result.analyses {
        doc.heading(format!("File: {} ({})", unit.filename, unit.status), 2);
        let style = if unit.status.is_failure() {
            TextStyle::Error
        } else {
            TextStyle::Body
        };
        doc.paragraph(unit.text.clone(), style);
    }

    doc
}

/// Build the integration guide, or `None` when no transcription succeeded
pub fn guide_document(result: &RunResult, reprocess: bool) -> Option<ReportDocument> {
    if !result.has_ok_transcription() {
        return None;
    }

    let language = result.target_language.as_deref().unwrap_or("N/A");
    let mut doc = ReportDocument::new(format!(
        "Application Guide for Code Migrated to {}{}",
        language,
        title_suffix(reprocess)
    ));
    doc.paragraph(GUIDE_INTRO, TextStyle::Body);

    let mut first_ok = true;
    for guide in &result.guides {
        if guide.status.is_ok() {
            if !first_ok {
                doc.page_break();
            }
            first_ok = false;
            doc.heading(
                format!(
                    "Guide for: {} (Migrated to {})",
                    guide.filename,
                    guide.target_language.as_deref().unwrap_or("N/A")
                ),
                1,
            );
            doc.paragraph(guide.text.clone(), TextStyle::Body);
        } else {
            doc.paragraph(
                format!(
                    "Error or Omission in Application Guide for: {} ({})",
                    guide.filename, guide.status
                ),
                TextStyle::Error,
            );
            doc.paragraph(guide.text.clone(), TextStyle::Error);
        }
    }

    Some(doc)
}
