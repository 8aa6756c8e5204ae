//! A small SVG writer for chart markup.
//!
//! Coordinates are pixels with y pointing down.  Text elements are only emitted when the
//! document was created with text enabled, so shape-only charts never ask `usvg` for fonts.

use std::fmt::Write as _;

use crate::palette::{Rgb, WHITE};

/// A point in chart pixel coordinates, y pointing down.
pub type Point = (f64, f64);

/// Horizontal text anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        }
    }
}

/// Vertical text anchor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Baseline {
    Top,
    Middle,
    Bottom,
}

impl Baseline {
    fn as_str(self) -> &'static str {
        match self {
            Self::Top => "text-before-edge",
            Self::Middle => "central",
            Self::Bottom => "text-after-edge",
        }
    }
}

/// Attributes of one text element.
#[derive(Clone, Copy, Debug)]
pub struct TextStyle {
    pub size: f64,
    pub color: Rgb,
    pub anchor: Anchor,
    pub baseline: Baseline,
    pub bold: bool,
    /// Clockwise rotation in degrees around the anchor point.
    pub rotate: f64,
}

impl TextStyle {
    pub fn new(size: f64, color: Rgb) -> Self {
        Self {
            size,
            color,
            anchor: Anchor::Start,
            baseline: Baseline::Bottom,
            bold: false,
            rotate: 0.0,
        }
    }

    pub fn anchored(mut self, anchor: Anchor, baseline: Baseline) -> Self {
        self.anchor = anchor;
        self.baseline = baseline;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotate = degrees;
        self
    }
}

/// Average advance of a sans-serif glyph relative to the font size.
const AVERAGE_ADVANCE: f64 = 0.55;

/// Largest size in `min..=size` at which `text` is expected to fit in `room` pixels.
pub fn fitted_font_size(text: &str, size: f64, min: f64, room: f64) -> f64 {
    let chars = text.chars().count().max(1) as f64;
    (room / (chars * AVERAGE_ADVANCE)).clamp(min, size)
}

/// Escapes the XML special characters of `text`.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// SVG markup under construction on a white background.
pub struct SvgDocument {
    width: u32,
    height: u32,
    text: bool,
    body: String,
}

impl SvgDocument {
    pub fn new(width: u32, height: u32, text: bool) -> Self {
        let mut document = Self {
            width,
            height,
            text,
            body: String::new(),
        };
        document.rect((0.0, 0.0), (width as f64, height as f64), WHITE, None);
        document
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Axis-aligned rectangle spanning the two corners, optionally outlined.
    pub fn rect(&mut self, a: Point, b: Point, fill: Rgb, outline: Option<(Rgb, f64)>) {
        let (x, y) = (a.0.min(b.0), a.1.min(b.1));
        let (w, h) = ((a.0 - b.0).abs(), (a.1 - b.1).abs());
        let stroke = match outline {
            Some((color, width)) => format!(" stroke='{color}' stroke-width='{width}'"),
            None => String::new(),
        };
        let _ = writeln!(
            self.body,
            "  <rect x='{x:.2}' y='{y:.2}' width='{w:.2}' height='{h:.2}' fill='{fill}'{stroke}/>"
        );
    }

    pub fn line(&mut self, a: Point, b: Point, width: f64, color: Rgb) {
        let _ = writeln!(
            self.body,
            "  <line x1='{:.2}' y1='{:.2}' x2='{:.2}' y2='{:.2}' stroke='{color}' stroke-width='{width}' stroke-linecap='round'/>",
            a.0, a.1, b.0, b.1
        );
    }

    pub fn circle(&mut self, centre: Point, radius: f64, width: f64, color: Rgb) {
        let _ = writeln!(
            self.body,
            "  <circle cx='{:.2}' cy='{:.2}' r='{radius:.2}' fill='none' stroke='{color}' stroke-width='{width}'/>",
            centre.0, centre.1
        );
    }

    /// Filled polygon; fewer than three points draw nothing.
    pub fn polygon(&mut self, points: &[Point], fill: Rgb, opacity: f64) {
        if points.len() < 3 {
            return;
        }
        let _ = writeln!(
            self.body,
            "  <polygon points='{}' fill='{fill}' fill-opacity='{opacity}'/>",
            points_attr(points)
        );
    }

    pub fn polyline(&mut self, points: &[Point], width: f64, color: Rgb) {
        if points.len() < 2 {
            return;
        }
        let _ = writeln!(
            self.body,
            "  <polyline points='{}' fill='none' stroke='{color}' stroke-width='{width}' stroke-linejoin='round'/>",
            points_attr(points)
        );
    }

    pub fn text(&mut self, content: &str, at: Point, style: TextStyle) {
        if !self.text || content.is_empty() {
            return;
        }
        let weight = if style.bold { " font-weight='bold'" } else { "" };
        let transform = if style.rotate != 0.0 {
            format!(" transform='rotate({} {:.2} {:.2})'", style.rotate, at.0, at.1)
        } else {
            String::new()
        };
        let _ = writeln!(
            self.body,
            "  <text x='{:.2}' y='{:.2}' font-size='{:.1}' fill='{}' text-anchor='{}' dominant-baseline='{}'{weight}{transform}>{}</text>",
            at.0,
            at.1,
            style.size,
            style.color,
            style.anchor.as_str(),
            style.baseline.as_str(),
            escape(content)
        );
    }

    /// Complete SVG markup.
    pub fn finish(self) -> String {
        format!(
            "<svg xmlns='http://www.w3.org/2000/svg' width='{w}' height='{h}' viewBox='0 0 {w} {h}' font-family='sans-serif'>\n{body}</svg>\n",
            w = self.width,
            h = self.height,
            body = self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_skipped_without_fonts() {
        let mut svg = SvgDocument::new(10, 10, false);
        svg.text("Horas", (1.0, 1.0), TextStyle::new(12.0, Rgb(0, 0, 0)));
        assert!(!svg.finish().contains("<text"));
    }

    #[test]
    fn text_is_escaped_and_rotated() {
        let mut svg = SvgDocument::new(10, 10, true);
        svg.text(
            "I&D <QA>",
            (5.0, 6.0),
            TextStyle::new(12.0, Rgb(0, 0, 0))
                .anchored(Anchor::End, Baseline::Top)
                .rotated(-15.0),
        );
        let markup = svg.finish();
        assert!(markup.contains(">I&amp;D &lt;QA&gt;</text>"));
        assert!(markup.contains("rotate(-15 5.00 6.00)"));
        assert!(markup.contains("text-anchor='end'"));
    }

    #[test]
    fn degenerate_shapes_are_dropped() {
        let mut svg = SvgDocument::new(10, 10, true);
        svg.polygon(&[(0.0, 0.0), (1.0, 1.0)], Rgb(0, 0, 0), 1.0);
        svg.polyline(&[(0.0, 0.0)], 1.0, Rgb(0, 0, 0));
        let markup = svg.finish();
        assert!(!markup.contains("<polygon"));
        assert!(!markup.contains("<polyline"));
    }

    #[test]
    fn long_labels_shrink_to_fit() {
        assert_eq!(fitted_font_size("QA", 22.0, 12.0, 500.0), 22.0);
        let shrunk = fitted_font_size("Arquitecto de soluciones cloud", 22.0, 12.0, 200.0);
        assert!(shrunk < 22.0 && shrunk >= 12.0);
        assert_eq!(fitted_font_size("x".repeat(200).as_str(), 22.0, 12.0, 10.0), 12.0);
    }
}
