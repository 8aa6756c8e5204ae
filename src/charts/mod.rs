//! Raster charts embedded in the report.
//!
//! Every chart is written as SVG markup by [`svg::SvgDocument`] and rasterised to PNG through
//! `resvg`.  Labels, titles and legends need a TrueType face; [`ChartRenderer::with_default_font`]
//! loads the upright faces of the family found by [`crate::fonts`] into a `fontdb` database and,
//! when none is available, charts are still produced without text.

pub mod radar;
pub mod roles;
pub mod svg;

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{fontdb, Options, Tree};

use crate::assessment::RoleSummary;
use crate::fonts;
use crate::palette::AZURE;
use crate::scoring::PillarSeries;

pub use svg::{Anchor, Baseline, Point, SvgDocument, TextStyle};

/// Cover banner size in pixels (8.27 × 1.2 in at 150 dpi).
pub const BANNER_SIZE: (u32, u32) = (1240, 180);

/// Errors produced while rasterising or encoding a chart.
#[derive(Debug)]
pub enum ChartError {
    /// The generated markup was rejected by `usvg`.
    Svg(resvg::usvg::Error),
    /// The pixel buffer could not be allocated.
    Allocate { width: u32, height: u32 },
    /// PNG encoding failed.
    Encode(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Svg(err) => write!(f, "Failed to parse chart markup: {err}"),
            Self::Allocate { width, height } => {
                write!(f, "Failed to allocate a {width}x{height} chart canvas")
            }
            Self::Encode(err) => write!(f, "Failed to encode chart image: {err}"),
        }
    }
}

impl std::error::Error for ChartError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Svg(err) => Some(err),
            Self::Allocate { .. } => None,
            Self::Encode(err) => Some(err.as_ref()),
        }
    }
}

impl From<resvg::usvg::Error> for ChartError {
    fn from(err: resvg::usvg::Error) -> Self {
        Self::Svg(err)
    }
}

/// An encoded chart together with its pixel dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Font database and family used for chart text.
#[derive(Clone)]
struct ChartFonts {
    database: Arc<fontdb::Database>,
    family: String,
}

/// Draws the report charts, optionally with text.
#[derive(Clone, Default)]
pub struct ChartRenderer {
    fonts: Option<ChartFonts>,
}

impl ChartRenderer {
    /// Uses every face in `database`; charts carry no text when it is empty.
    pub fn new(database: fontdb::Database) -> Self {
        let family = database
            .faces()
            .find_map(|face| face.families.first().map(|(name, _)| name.clone()));
        let Some(family) = family else {
            return Self::without_text();
        };

        let mut database = database;
        database.set_sans_serif_family(family.clone());
        Self {
            fonts: Some(ChartFonts {
                database: Arc::new(database),
                family,
            }),
        }
    }

    /// A renderer that draws shapes only.
    pub fn without_text() -> Self {
        Self::default()
    }

    /// Loads the regular and bold faces of the resolved font family; falls back to shapes only.
    pub fn with_default_font() -> Self {
        let files = match fonts::resolve_font_files() {
            Ok(files) => files,
            Err(err) => {
                warn!("Charts will be rendered without labels: {}", err);
                return Self::without_text();
            }
        };

        let mut database = fontdb::Database::new();
        for path in files.upright_faces() {
            if let Err(err) = database.load_font_file(path) {
                debug!("Skipping chart face {}: {}", path.display(), err);
            }
        }
        let renderer = Self::new(database);
        if !renderer.has_text() {
            warn!(
                "Charts will be rendered without labels: no usable face in {}",
                files.family()
            );
        }
        renderer
    }

    /// Returns `true` when charts include titles, labels and legends.
    pub fn has_text(&self) -> bool {
        self.fonts.is_some()
    }

    fn document(&self, (width, height): (u32, u32)) -> SvgDocument {
        SvgDocument::new(width, height, self.has_text())
    }

    /// Rasterises finished chart markup to PNG.
    fn rasterise(&self, document: SvgDocument) -> Result<ChartImage, ChartError> {
        let (width, height) = (document.width(), document.height());

        let mut options = Options::default();
        if let Some(fonts) = &self.fonts {
            options.fontdb = Arc::clone(&fonts.database);
            options.font_family = fonts.family.clone();
        }
        let tree = Tree::from_str(&document.finish(), &options)?;

        let mut pixmap = Pixmap::new(width, height).ok_or(ChartError::Allocate { width, height })?;
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());
        let png = pixmap
            .encode_png()
            .map_err(|err| ChartError::Encode(Box::new(err)))?;
        Ok(ChartImage { png, width, height })
    }

    /// Solid azure band for the top of the cover page.
    pub fn banner(&self) -> Result<ChartImage, ChartError> {
        let mut document = self.document(BANNER_SIZE);
        document.rect(
            (0.0, 0.0),
            (BANNER_SIZE.0 as f64, BANNER_SIZE.1 as f64),
            AZURE,
            None,
        );
        self.rasterise(document)
    }

    /// Radar chart of current vs. projected pillar percentages.
    pub fn radar(&self, series: &PillarSeries) -> Result<ChartImage, ChartError> {
        let mut document = self.document(radar::SIZE);
        radar::draw(&mut document, series);
        self.rasterise(document)
    }

    /// Bar chart of effort hours per role.
    pub fn role_hours(&self, roles: &[RoleSummary]) -> Result<ChartImage, ChartError> {
        let mut document = self.document(roles::BAR_SIZE);
        roles::draw_hours(&mut document, roles);
        self.rasterise(document)
    }

    /// Pie chart of the effort share per role.
    pub fn role_share(&self, roles: &[RoleSummary]) -> Result<ChartImage, ChartError> {
        let mut document = self.document(roles::PIE_SIZE);
        roles::draw_share(&mut document, roles);
        self.rasterise(document)
    }
}

/// Tick step giving roughly `target` intervals up to `max`, rounded to 1, 2 or 5 × 10ⁿ.
pub fn nice_step(max: f64, target: usize) -> f64 {
    if !max.is_finite() || max <= 0.0 || target == 0 {
        return 1.0;
    }
    let raw = max / target as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let residual = raw / magnitude;
    let factor = if residual <= 1.0 {
        1.0
    } else if residual <= 2.0 {
        2.0
    } else if residual <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * magnitude
}

/// Formats a number the way axis labels show it: no trailing `.0` for integers.
pub fn format_tick(value: f64) -> String {
    if value.abs() >= 1e15 {
        format!("{value:e}")
    } else if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nice_steps_round_to_one_two_five() {
        assert_eq!(nice_step(100.0, 5), 20.0);
        assert_eq!(nice_step(37.0, 5), 10.0);
        assert_eq!(nice_step(9.0, 5), 2.0);
        assert_eq!(nice_step(1200.0, 5), 500.0);
        assert_eq!(nice_step(0.0, 5), 1.0);
        assert_eq!(nice_step(f64::NAN, 5), 1.0);
        assert_eq!(nice_step(f64::INFINITY, 5), 1.0);
    }

    #[test]
    fn ticks_drop_trailing_zeros() {
        assert_eq!(format_tick(40.0), "40");
        assert_eq!(format_tick(2.5), "2.5");
        assert_eq!(format_tick(0.25), "0.25");
        assert_eq!(format_tick(2e300), "2e300");
    }

    #[test]
    fn renderer_without_faces_has_no_text() {
        assert!(!ChartRenderer::new(fontdb::Database::new()).has_text());
        assert!(!ChartRenderer::without_text().has_text());
    }

    #[test]
    fn banner_is_solid_azure() {
        let chart = ChartRenderer::without_text().banner().expect("banner");
        assert_eq!((chart.width, chart.height), BANNER_SIZE);
        let decoded = image::load_from_memory(&chart.png).expect("decode").to_rgb8();
        assert_eq!(decoded.get_pixel(10, 10).0, AZURE.channels());
    }
}
