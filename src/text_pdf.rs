//! Plain text to paginated PDF, used to produce sample assessment documents.

use std::fs;
use std::path::Path;

use genpdf::elements::{Break, Paragraph};
use genpdf::{Margins, PaperSize};
use log::info;

use crate::builder::DocumentBuilder;
use crate::error::ReportError;

pub const DEFAULT_INPUT: &str = "test-devops-assessment.txt";
pub const DEFAULT_OUTPUT: &str = "test-devops-assessment.pdf";

/// Longest line kept, in characters.
pub const MAX_LINE_CHARS: usize = 95;
pub const FONT_SIZE: u8 = 10;
/// 12 pt baseline-to-baseline at 10 pt text.
const LINE_SPACING: f64 = 1.2;

const INCH_MM: f64 = 25.4;

/// Right-trims every line and cuts it to [`MAX_LINE_CHARS`] characters.
pub fn prepare_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_end().chars().take(MAX_LINE_CHARS).collect())
        .collect()
}

/// Renders `text` onto Letter pages: 1 in top and bottom margins, 0.75 in side margins.
pub fn render_text_pdf(text: &str) -> Result<Vec<u8>, ReportError> {
    let mut document = DocumentBuilder::new()
        .with_title("DevOps assessment")
        .with_paper_size(PaperSize::Letter)
        .with_margins(Margins::trbl(
            INCH_MM,
            0.75 * INCH_MM,
            INCH_MM,
            0.75 * INCH_MM,
        ))
        .with_font_size(FONT_SIZE)
        .with_line_spacing(LINE_SPACING)
        .build()?;

    for line in prepare_lines(text) {
        if line.is_empty() {
            document.push(Break::new(1));
        } else {
            document.push(Paragraph::new(line));
        }
    }

    let mut bytes = Vec::new();
    document.render(&mut bytes)?;
    Ok(bytes)
}

/// Reads `input` and writes its PDF rendering to `output`.
pub fn convert_file(input: &Path, output: &Path) -> Result<(), ReportError> {
    if !input.is_file() {
        return Err(ReportError::InputNotFound(input.to_path_buf()));
    }
    let text = fs::read_to_string(input).map_err(|err| ReportError::io(input, err))?;
    let bytes = render_text_pdf(&text)?;
    fs::write(output, &bytes).map_err(|err| ReportError::io(output, err))?;
    info!(
        "Converted {} ({} lines) into {}",
        input.display(),
        text.lines().count(),
        output.display()
    );
    Ok(())
}
