//! Plain-text rendering of reports.

use crate::packaging::report::{Block, ReportDocument, TextStyle};

/// Marker placed where a PDF would start a new page
pub const PAGE_BREAK: &str = "\n\u{000C}\n";

/// Render a report as UTF-8 text
pub fn render(report: &ReportDocument) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(&report.title);
    out.push('\n');
    out.push_str(&"=".repeat(report.title.chars().count()));
    out.push_str("\n\n");

    for block in &report.blocks {
        match block {
            Block::Heading { text, level } => {
                let underline = if *level <= 1 { '=' } else { '-' };
                out.push_str(text);
                out.push('\n');
                out.push_str(&underline.to_string().repeat(text.chars().count()));
                out.push_str("\n\n");
            }
            Block::Paragraph { text, style } => {
                if *style == TextStyle::Error {
                    out.push_str("[ERROR] ");
                }
                out.push_str(text.trim_end());
                out.push_str("\n\n");
            }
            Block::PageBreak => out.push_str(PAGE_BREAK),
        }
    }

    out.into_bytes()
}
