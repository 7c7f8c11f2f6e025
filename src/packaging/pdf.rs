//! PDF rendering with `printpdf` builtin fonts.

use std::io::BufWriter;

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Rgb,
};

use crate::errors::PipelineError;
use crate::packaging::report::{Block, ReportDocument, TextStyle};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP: f32 = 280.0;
const BOTTOM: f32 = 18.0;
const LEFT: f32 = 20.0;
const BODY_SIZE: f32 = 9.0;
const BODY_LINE: f32 = 4.5;
const BODY_WRAP: usize = 95;

fn pdf_error(context: &str, e: impl std::fmt::Display) -> PipelineError {
    PipelineError::Packaging(format!("PDF {} error: {}", context, e))
}

/// Tracks the current page and vertical position
struct PageCursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
    font: IndirectFontRef,
    bold: IndirectFontRef,
}

impl PageCursor {
    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = TOP;
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < BOTTOM {
            self.new_page();
        }
    }

    fn line(&mut self, text: &str, size: f32, line_height: f32, bold: bool, style: TextStyle) {
        self.ensure_space(line_height);
        let color = match style {
            TextStyle::Body => Rgb::new(0.0, 0.0, 0.0, None),
            TextStyle::Error => Rgb::new(0.8, 0.0, 0.0, None),
        };
        self.layer.set_fill_color(Color::Rgb(color));
        let font = if bold { &self.bold } else { &self.font };
        self.layer.use_text(text, size, Mm(LEFT), Mm(self.y), font);
        self.y -= line_height;
    }

    fn gap(&mut self, height: f32) {
        self.y -= height;
    }
}

/// Render a report to PDF bytes
pub fn render(report: &ReportDocument) -> Result<Vec<u8>, PipelineError> {
    let (doc, page1, layer1) = PdfDocument::new(&report.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| pdf_error("font", e))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| pdf_error("font", e))?;

    let mut cursor = PageCursor {
        doc,
        layer,
        y: TOP,
        font,
        bold,
    };

    for line in wrap_text(&report.title, 60) {
        cursor.line(&line, 16.0, 8.0, true, TextStyle::Body);
    }
    cursor.gap(6.0);

    for block in &report.blocks {
        match block {
            Block::Heading { text, level } => {
                let (size, line_height, wrap) = if *level <= 1 { (13.0, 6.5, 70) } else { (11.0, 5.5, 80) };
                cursor.ensure_space(line_height * 2.0);
                for line in wrap_text(text, wrap) {
                    cursor.line(&line, size, line_height, true, TextStyle::Body);
                }
                cursor.gap(2.0);
            }
            Block::Paragraph { text, style } => {
                for raw_line in text.lines() {
                    for line in wrap_text(&raw_line.replace('\t', "    "), BODY_WRAP) {
                        cursor.line(&line, BODY_SIZE, BODY_LINE, false, *style);
                    }
                }
                cursor.gap(6.0);
            }
            Block::PageBreak => cursor.new_page(),
        }
    }

    let PageCursor { doc, .. } = cursor;
    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf).map_err(|e| pdf_error("save", e))?;
    buf.into_inner().map_err(|e| pdf_error("buffer", e))
}

/// Word-wrap helper for PDF text rendering.
///
/// Leading indentation is repeated on every wrapped line and words longer
/// than the line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let body = text.trim_start();
    let indent: String = text[..text.len() - body.len()].chars().take(max_chars / 2).collect();
    let width = max_chars - indent.chars().count();

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in body.split_whitespace() {
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > width {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = chars.split_off(width);
            lines.push(chars.into_iter().collect());
            chars = rest;
        }

        if current_len > 0 && current_len + 1 + chars.len() > width {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += chars.len();
        current.extend(chars);
    }
    if current_len > 0 {
        lines.push(current);
    }
    if lines.is_empty() {
        return vec![String::new()];
    }
    lines.into_iter().map(|line| format!("{}{}", indent, line)).collect()
}
