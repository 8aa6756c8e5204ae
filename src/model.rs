//! Data structures describing the logical content of a report document.
//!
//! The types in this module form a renderer-independent model.  The report compiler produces a
//! [`ReportDocument`] and the DOCX and PDF renderers consume it, so neither side needs to know
//! about the other.

use crate::richtext::Span;

/// Rich text paragraph made of styled spans.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RichParagraph {
    spans: Vec<Span>,
}

impl RichParagraph {
    pub fn new(spans: impl Into<Vec<Span>>) -> Self {
        Self {
            spans: spans.into(),
        }
    }

    /// Creates a paragraph holding a single unstyled span.
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(vec![Span::new(text)])
    }

    /// Returns the spans that make up the paragraph.
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }
}

/// An encoded PNG image scaled to a fixed width.
///
/// Renderers derive the height from the pixel dimensions so the aspect ratio is kept.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBlock {
    png: Vec<u8>,
    width_mm: f64,
}

impl ImageBlock {
    pub fn new(png: impl Into<Vec<u8>>, width_mm: f64) -> Self {
        Self {
            png: png.into(),
            width_mm,
        }
    }

    pub fn png(&self) -> &[u8] {
        &self.png
    }

    /// Rendered width in millimetres.
    pub fn width_mm(&self) -> f64 {
        self.width_mm
    }
}

/// A fixed-layout table: one header row followed by text rows.
///
/// Rows shorter than the header are padded with empty cells by the renderers; extra cells are
/// dropped.  Column weights are relative widths and default to equal columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableBlock {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    column_weights: Option<Vec<usize>>,
}

impl TableBlock {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of columns, as defined by the header row.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Returns the relative column widths, one per header.
    pub fn column_weights(&self) -> Vec<usize> {
        match &self.column_weights {
            Some(weights) if weights.len() == self.headers.len() => weights.clone(),
            _ => vec![1; self.headers.len()],
        }
    }

    /// Returns `row` padded or truncated to the column count.
    pub fn normalized_row<'a>(&self, row: &'a [String]) -> Vec<&'a str> {
        (0..self.column_count())
            .map(|index| row.get(index).map(String::as_str).unwrap_or(""))
            .collect()
    }

    pub fn with_rows<R, I, S>(mut self, rows: R) -> Self
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.extend(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect()),
        );
        self
    }

    pub fn with_column_weights(mut self, weights: impl Into<Vec<usize>>) -> Self {
        self.column_weights = Some(weights.into());
        self
    }
}

/// Individual content blocks that make up sections and the cover.
#[derive(Clone, Debug, PartialEq)]
pub enum Block {
    /// Sub-heading; level 1 is reserved for section titles.
    Heading { level: u8, text: String },
    /// Styled paragraph content.
    Paragraph(RichParagraph),
    /// A bulleted list item.
    Bullet(RichParagraph),
    Table(TableBlock),
    Image(ImageBlock),
}

impl Block {
    /// Convenience helper for building a paragraph block.
    pub fn paragraph(spans: impl Into<Vec<Span>>) -> Self {
        Self::Paragraph(RichParagraph::new(spans))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Paragraph(RichParagraph::plain(text))
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::Heading {
            level,
            text: text.into(),
        }
    }

    pub fn bullet(text: impl Into<String>) -> Self {
        Self::Bullet(RichParagraph::plain(text))
    }

    /// Image block `width_mm` wide.
    pub fn image(png: impl Into<Vec<u8>>, width_mm: f64) -> Self {
        Self::Image(ImageBlock::new(png, width_mm))
    }
}

/// Metadata that describes the cover page of a document.
///
/// Cover blocks (banner, logo) are laid out above the title; the subtitle and identifier follow
/// it, and renderers close the cover with a page break.
#[derive(Clone, Debug, PartialEq)]
pub struct Cover {
    title: String,
    subtitle: Option<String>,
    identifier: Option<String>,
    blocks: Vec<Block>,
}

impl Cover {
    /// Creates a new cover with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            identifier: None,
            blocks: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    /// Returns the identifier line (for example the client), if any.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Returns the content blocks rendered above the title.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<Option<String>>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<Option<String>>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Appends a block to the cover and returns the updated instance.
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }
}

/// Logical representation of a document section.
#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    identifier: Option<String>,
    title: String,
    blocks: Vec<Block>,
}

impl Section {
    /// Creates a new section with the provided title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            identifier: None,
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    /// Returns the section identifier used for bookmarks or cross references.
    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn with_identifier(mut self, identifier: impl Into<Option<String>>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Appends a block and returns the updated section.
    pub fn with_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Extends the section with additional blocks and returns the updated instance.
    pub fn with_blocks<I>(mut self, blocks: I) -> Self
    where
        I: IntoIterator<Item = Block>,
    {
        self.blocks.extend(blocks);
        self
    }
}

/// A complete document: optional cover followed by sections in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReportDocument {
    title: String,
    cover: Option<Cover>,
    sections: Vec<Section>,
}

impl ReportDocument {
    /// Creates an empty document; the title ends up in the output metadata.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn cover(&self) -> Option<&Cover> {
        self.cover.as_ref()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn with_cover(mut self, cover: Cover) -> Self {
        self.cover = Some(cover);
        self
    }

    pub fn add_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Looks up a section by its identifier.
    pub fn section(&self, identifier: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.identifier() == Some(identifier))
    }
}

/// Encoded output of a renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::{Block, ReportDocument, Section, TableBlock};

    #[test]
    fn sections_are_found_by_identifier() {
        let document = ReportDocument::new("Reporte")
            .add_section(Section::new("Roadmap").with_identifier(Some("roadmap".to_owned())))
            .add_section(
                Section::new("Conclusión")
                    .with_identifier(Some("conclusion".to_owned()))
                    .with_blocks([Block::text("fin"), Block::bullet("punto")]),
            );

        let conclusion = document.section("conclusion").expect("conclusion");
        assert_eq!(conclusion.title(), "Conclusión");
        assert_eq!(conclusion.blocks().len(), 2);
        assert!(document.section("servicios-azure").is_none());
    }

    #[test]
    fn table_rows_are_normalized_to_header_width() {
        let table = TableBlock::new(["A", "B", "C"])
            .with_rows([vec!["1"], vec!["1", "2", "3", "4"]]);

        assert_eq!(table.normalized_row(&table.rows()[0]), vec!["1", "", ""]);
        assert_eq!(table.normalized_row(&table.rows()[1]), vec!["1", "2", "3"]);
    }

    #[test]
    fn mismatched_weights_fall_back_to_equal_columns() {
        let table = TableBlock::new(["A", "B"]).with_column_weights(vec![1, 2, 3]);
        assert_eq!(table.column_weights(), vec![1, 1]);

        let table = TableBlock::new(["A", "B"]).with_column_weights(vec![1, 3]);
        assert_eq!(table.column_weights(), vec![1, 3]);
    }
}
