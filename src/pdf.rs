//! PDF rendering of a [`ReportDocument`] through `genpdf`.
//!
//! Uses the font family resolved by [`crate::fonts`] on A4 pages with a page-numbered footer.
//! Section headings are wrapped in [`PageMarker`]s so that, with the `bookmarks` feature, an
//! outline entry can point at the page where each section starts.

use genpdf::elements::{
    Break, FrameCellDecorator, LinearLayout, PageBreak, Paragraph, TableLayout, UnorderedList,
};
use genpdf::style::{Style, StyledString};
use genpdf::{Alignment, Element as _, Margins};
use log::debug;

use crate::builder::DocumentBuilder;
use crate::elements::{mm_from_f64, PageMarker, PageSlot, ScaledImage};
use crate::error::ReportError;
use crate::model::{
    Block, Cover, ImageBlock, RenderedDocument, ReportDocument, RichParagraph, TableBlock,
};
use crate::palette::AZURE;

const TITLE_SIZE: u8 = 28;
const HEADING_SIZES: [u8; 3] = [20, 14, 12];
const BODY_SIZE: u8 = 11;
const FOOTER_SIZE: u8 = 8;

/// Start page of each section, index-aligned with [`ReportDocument::sections`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionPages(pub Vec<Option<usize>>);

/// Renders `document` as PDF bytes.
pub fn render_pdf(document: &ReportDocument) -> Result<RenderedDocument, ReportError> {
    render_pdf_with_pages(document).map(|(rendered, _)| rendered)
}

/// Renders `document` and reports the page on which each section starts.
pub fn render_pdf_with_pages(
    document: &ReportDocument,
) -> Result<(RenderedDocument, SectionPages), ReportError> {
    let builder = DocumentBuilder::new()
        .with_title(document.title())
        .with_paper_size(genpdf::PaperSize::A4)
        .with_margins(Margins::trbl(20, 20, 15, 20))
        .with_font_size(BODY_SIZE)
        .with_footer(10, |page| {
            Paragraph::new(format!("Página {page}"))
                .aligned(Alignment::Center)
                .styled(Style::new().with_font_size(FOOTER_SIZE))
        });
    let pages = builder.page_counter();
    let mut pdf = builder.build()?;

    if let Some(cover) = document.cover() {
        push_cover(&mut pdf, cover)?;
    }

    let mut slots = Vec::with_capacity(document.sections().len());
    for section in document.sections() {
        let marker = PageMarker::new(heading(1, section.title()), pages.clone());
        slots.push(marker.slot());
        pdf.push(marker);

        for block in section.blocks() {
            push_block(&mut pdf, block)?;
        }
    }

    let mut bytes = Vec::new();
    pdf.render(&mut bytes)?;
    let section_pages = SectionPages(slots.iter().map(PageSlot::page).collect());
    debug!(
        "Rendered PDF '{}' ({} bytes, {} pages)",
        document.title(),
        bytes.len(),
        pages.current()
    );
    Ok((RenderedDocument { bytes }, section_pages))
}

/// Renders `document` and adds one outline entry per section.
#[cfg(feature = "bookmarks")]
pub fn render_pdf_with_bookmarks(
    document: &ReportDocument,
) -> Result<RenderedDocument, ReportError> {
    use crate::bookmarks::{apply_outline, OutlineTarget};

    let (rendered, pages) = render_pdf_with_pages(document)?;
    let targets: Vec<OutlineTarget> = document
        .sections()
        .iter()
        .zip(pages.0)
        .filter_map(|(section, page)| {
            page.map(|page| OutlineTarget {
                title: section.title().to_owned(),
                name: section.identifier().map(str::to_owned),
                page,
            })
        })
        .collect();

    let bytes = apply_outline(&rendered.bytes, &targets)?;
    Ok(RenderedDocument { bytes })
}

fn heading_style(level: u8) -> Style {
    let size = HEADING_SIZES[usize::from(level.clamp(1, 3) - 1)];
    Style::new()
        .bold()
        .with_font_size(size)
        .with_color(AZURE.into())
}

fn heading(level: u8, text: &str) -> Paragraph {
    let mut paragraph = Paragraph::new(StyledString::new(text.to_owned(), heading_style(level)));
    paragraph.set_alignment(Alignment::Left);
    paragraph
}

fn rich_paragraph(paragraph: &RichParagraph) -> Paragraph {
    let mut element = Paragraph::default();
    for span in paragraph.spans() {
        element.push(span.to_styled_string());
    }
    element
}

fn image_element(block: &ImageBlock) -> Result<ScaledImage, ReportError> {
    Ok(ScaledImage::from_bytes(
        block.png(),
        mm_from_f64(block.width_mm()),
    )?)
}

fn table_element(table: &TableBlock) -> Result<TableLayout, ReportError> {
    let mut layout = TableLayout::new(table.column_weights());
    layout.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    let header_style = Style::new().bold().with_color(AZURE.into());
    let mut header = layout.row();
    for text in table.headers() {
        header = header.element(Paragraph::new(text.as_str()).styled(header_style).padded(1));
    }
    header.push()?;

    for row in table.rows() {
        let mut cells = layout.row();
        for text in table.normalized_row(row) {
            cells = cells.element(Paragraph::new(text).padded(1));
        }
        cells.push()?;
    }
    Ok(layout)
}

fn push_block(pdf: &mut genpdf::Document, block: &Block) -> Result<(), ReportError> {
    match block {
        Block::Heading { level, text } => pdf.push(heading(*level, text)),
        Block::Paragraph(paragraph) => pdf.push(rich_paragraph(paragraph)),
        Block::Bullet(paragraph) => {
            let mut list = UnorderedList::new();
            list.push(rich_paragraph(paragraph));
            pdf.push(list);
        }
        Block::Table(table) => {
            pdf.push(table_element(table)?);
            pdf.push(Break::new(1));
        }
        Block::Image(image) => pdf.push(image_element(image)?),
    }
    Ok(())
}

fn push_cover(pdf: &mut genpdf::Document, cover: &Cover) -> Result<(), ReportError> {
    for block in cover.blocks() {
        push_block(pdf, block)?;
    }

    let mut layout = LinearLayout::vertical();
    layout.push(Break::new(1));
    layout.push(Paragraph::new(StyledString::new(
        cover.title().to_owned(),
        Style::new()
            .bold()
            .with_font_size(TITLE_SIZE)
            .with_color(AZURE.into()),
    )));
    if let Some(subtitle) = cover.subtitle() {
        layout.push(heading(2, subtitle));
    }
    if let Some(identifier) = cover.identifier() {
        layout.push(heading(3, identifier));
    }
    pdf.push(layout);
    pdf.push(PageBreak::new());
    Ok(())
}
