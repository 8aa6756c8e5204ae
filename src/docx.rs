//! DOCX rendering of a [`ReportDocument`] through `docx-rs`.
//!
//! Page geometry is A4 portrait with 1 in margins.  The style sheet mirrors the report's branding:
//! Calibri 11 pt body text, an azure 28 pt title and azure headings.

use std::io::Cursor;

use docx_rs::{
    AbstractNumbering, BreakType, Docx, IndentLevel, Level, LevelJc, LevelText,
    NumberFormat, Numbering, NumberingId, PageMargin, Paragraph, Pic, Run, RunFonts, Shading,
    Start, Style, StyleType, Table, TableCell, TableRow,
};
use image::GenericImageView;
use log::debug;

use crate::error::ReportError;
use crate::model::{
    Block, Cover, ImageBlock, RenderedDocument, ReportDocument, RichParagraph, Section, TableBlock,
};
use crate::palette::{AZURE, WHITE};
use crate::richtext::Span;

const FONT: &str = "Calibri";
/// Sizes in half-points.
const BODY_SIZE: usize = 22;
const TITLE_SIZE: usize = 56;
const HEADING_SIZES: [usize; 3] = [40, 28, 24];

/// A4 in twentieths of a point.
const PAGE_WIDTH: u32 = 11906;
const PAGE_HEIGHT: u32 = 16838;
const MARGIN: i32 = 1440;
const TEXT_WIDTH: usize = PAGE_WIDTH as usize - 2 * MARGIN as usize;

const EMU_PER_MM: f64 = 36_000.0;
const BULLET_NUMBERING: usize = 1;

/// Renders `document` as a DOCX package.
pub fn render_docx(document: &ReportDocument) -> Result<RenderedDocument, ReportError> {
    let mut docx = base_document();

    if let Some(cover) = document.cover() {
        for paragraph in cover_paragraphs(cover)? {
            docx = docx.add_paragraph(paragraph);
        }
    }

    for section in document.sections() {
        docx = render_section(docx, section)?;
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|err| ReportError::Docx(Box::new(err)))?;
    let bytes = buffer.into_inner();
    debug!("Packaged DOCX '{}' ({} bytes)", document.title(), bytes.len());
    Ok(RenderedDocument { bytes })
}

fn base_document() -> Docx {
    let heading = |level: usize, size: usize| {
        Style::new(format!("Heading{level}"), StyleType::Paragraph)
            .name(format!("Heading {level}"))
            .size(size)
            .color(AZURE.hex())
            .bold()
    };

    let bullet_level = Level::new(
        0,
        Start::new(1),
        NumberFormat::new("bullet"),
        LevelText::new("•"),
        LevelJc::new("left"),
    );

    Docx::new()
        .page_size(PAGE_WIDTH, PAGE_HEIGHT)
        .page_margin(
            PageMargin::new()
                .top(MARGIN)
                .bottom(MARGIN)
                .left(MARGIN)
                .right(MARGIN),
        )
        .default_fonts(RunFonts::new().ascii(FONT).hi_ansi(FONT).cs(FONT))
        .default_size(BODY_SIZE)
        .add_style(
            Style::new("Title", StyleType::Paragraph)
                .name("Title")
                .size(TITLE_SIZE)
                .color(AZURE.hex())
                .bold(),
        )
        .add_style(heading(1, HEADING_SIZES[0]))
        .add_style(heading(2, HEADING_SIZES[1]))
        .add_style(heading(3, HEADING_SIZES[2]))
        .add_abstract_numbering(AbstractNumbering::new(BULLET_NUMBERING).add_level(bullet_level))
        .add_numbering(Numbering::new(BULLET_NUMBERING, BULLET_NUMBERING))
}

fn run(span: &Span) -> Run {
    let mut run = Run::new().add_text(span.text());
    if span.is_bold() {
        run = run.bold();
    }
    if span.is_italic() {
        run = run.italic();
    }
    if let Some(color) = span.color() {
        run = run.color(color.hex());
    }
    run
}

fn rich_paragraph(paragraph: &RichParagraph) -> Paragraph {
    paragraph
        .spans()
        .iter()
        .fold(Paragraph::new(), |docx_paragraph, span| {
            docx_paragraph.add_run(run(span))
        })
}

fn heading(level: u8, text: &str) -> Paragraph {
    let level = level.clamp(1, 3);
    Paragraph::new()
        .add_run(Run::new().add_text(text))
        .style(&format!("Heading{level}"))
}

fn page_break() -> Paragraph {
    Paragraph::new().add_run(Run::new().add_break(BreakType::Page))
}

fn cover_paragraphs(cover: &Cover) -> Result<Vec<Paragraph>, ReportError> {
    let mut paragraphs = Vec::new();
    for block in cover.blocks() {
        paragraphs.extend(block_paragraph(block)?);
    }

    paragraphs.push(
        Paragraph::new()
            .add_run(Run::new().add_text(cover.title()))
            .style("Title"),
    );
    if let Some(subtitle) = cover.subtitle() {
        paragraphs.push(heading(2, subtitle));
    }
    if let Some(identifier) = cover.identifier() {
        paragraphs.push(heading(3, identifier));
    }
    paragraphs.push(page_break());
    Ok(paragraphs)
}

/// Paragraph-level output of a block; tables are not paragraphs and yield `None`.
fn block_paragraph(block: &Block) -> Result<Option<Paragraph>, ReportError> {
    let paragraph = match block {
        Block::Heading { level, text } => heading(*level, text),
        Block::Paragraph(paragraph) => rich_paragraph(paragraph),
        Block::Bullet(paragraph) => rich_paragraph(paragraph)
            .numbering(NumberingId::new(BULLET_NUMBERING), IndentLevel::new(0)),
        Block::Image(image) => image_paragraph(image)?,
        Block::Table(_) => return Ok(None),
    };
    Ok(Some(paragraph))
}

fn render_section(mut docx: Docx, section: &Section) -> Result<Docx, ReportError> {
    docx = docx.add_paragraph(heading(1, section.title()));
    for block in section.blocks() {
        if let Block::Table(table) = block {
            docx = docx.add_table(table_element(table)).add_paragraph(Paragraph::new());
            continue;
        }
        if let Some(paragraph) = block_paragraph(block)? {
            docx = docx.add_paragraph(paragraph);
        }
    }
    Ok(docx)
}

/// Twip width of each column, proportional to the table's column weights.
pub fn column_widths(table: &TableBlock) -> Vec<usize> {
    let weights = table.column_weights();
    let total: usize = weights.iter().sum::<usize>().max(1);
    weights
        .iter()
        .map(|weight| TEXT_WIDTH * weight / total)
        .collect()
}

fn table_element(table: &TableBlock) -> Table {
    let widths = column_widths(table);

    let header = TableRow::new(
        table
            .headers()
            .iter()
            .map(|text| {
                TableCell::new()
                    .add_paragraph(
                        Paragraph::new()
                            .add_run(Run::new().add_text(text).bold().color(WHITE.hex())),
                    )
                    .shading(Shading::new().fill(AZURE.hex()))
            })
            .collect(),
    );

    let mut rows = vec![header];
    rows.extend(table.rows().iter().map(|row| {
        TableRow::new(
            table
                .normalized_row(row)
                .into_iter()
                .map(|text| {
                    TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(text)))
                })
                .collect(),
        )
    }));

    Table::new(rows).set_grid(widths)
}

/// Extent of an image in EMU when scaled to `width_mm`, keeping its aspect ratio.
pub fn image_extent(pixels: (u32, u32), width_mm: f64) -> (u32, u32) {
    let (px_width, px_height) = pixels;
    let width = width_mm * EMU_PER_MM;
    let height = if px_width == 0 {
        0.0
    } else {
        width * px_height as f64 / px_width as f64
    };
    (width.round() as u32, height.round() as u32)
}

fn image_paragraph(block: &ImageBlock) -> Result<Paragraph, ReportError> {
    let pixels = image::load_from_memory(block.png())
        .map_err(|err| ReportError::Docx(Box::new(err)))?
        .dimensions();
    let (width, height) = image_extent(pixels, block.width_mm());

    let picture = Pic::new(block.png()).size(width, height);
    Ok(Paragraph::new().add_run(Run::new().add_image(picture)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_keeps_aspect_ratio() {
        // 6.2 in wide
        let (width, height) = image_extent((1100, 550), 157.48);
        assert_eq!(width, 5_669_280);
        assert_eq!(height, 2_834_640);
        assert_eq!(image_extent((0, 10), 10.0), (360_000, 0));
    }

    #[test]
    fn column_widths_follow_weights() {
        let table = TableBlock::new(["A", "B"]).with_column_weights(vec![1, 3]);
        assert_eq!(column_widths(&table), vec![TEXT_WIDTH / 4, TEXT_WIDTH * 3 / 4]);

        let equal = TableBlock::new(["A", "B", "C"]);
        assert!(column_widths(&equal).iter().all(|w| *w == TEXT_WIDTH / 3));
    }

    #[test]
    fn section_title_precedes_its_blocks() {
        let document = ReportDocument::new("Reporte").add_section(
            Section::new("Roadmap")
                .with_block(Block::text("Mes 1"))
                .with_block(Block::Table(TableBlock::new(["Mes", "Entregables"]))),
        );
        let rendered = render_docx(&document).expect("render");

        let mut archive = zip::ZipArchive::new(Cursor::new(rendered.bytes)).expect("zip");
        let mut xml = String::new();
        std::io::Read::read_to_string(
            &mut archive.by_name("word/document.xml").expect("document part"),
            &mut xml,
        )
        .expect("utf-8");
        let title = xml.find("Roadmap").expect("title");
        let first_block = xml.find("Mes 1").expect("paragraph");
        assert!(title < first_block);
        assert!(xml.contains("Entregables"));
    }

    #[test]
    fn undecodable_images_are_docx_errors() {
        let block = ImageBlock::new(b"not a png".to_vec(), 10.0);
        assert!(matches!(image_paragraph(&block), Err(ReportError::Docx(_))));
    }

    #[test]
    fn empty_document_packages() {
        let rendered = render_docx(&ReportDocument::new("vacío")).expect("render");
        assert!(rendered.bytes.starts_with(b"PK"));
    }
}
