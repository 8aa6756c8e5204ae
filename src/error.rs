//! Error type shared by the report compiler, the renderers and the text-to-PDF utility.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::charts::ChartError;

#[cfg(feature = "bookmarks")]
use crate::bookmarks::BookmarkError;

/// Errors that abort report generation.
#[derive(Debug)]
pub enum ReportError {
    /// A required input file does not exist.
    InputNotFound(PathBuf),
    /// Reading or writing `path` failed.
    Io { path: PathBuf, source: io::Error },
    /// The assessment file is not valid JSON.
    Json(serde_json::Error),
    /// A chart could not be rasterised or encoded.
    Chart(ChartError),
    /// DOCX packaging failed.
    Docx(Box<dyn std::error::Error + Send + Sync>),
    /// PDF layout or rendering failed.
    Pdf(genpdf::error::Error),
    /// Embedding the PDF outline failed.
    #[cfg(feature = "bookmarks")]
    Bookmark(BookmarkError),
}

impl ReportError {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InputNotFound(path) => write!(f, "Input file not found: {}", path.display()),
            Self::Io { path, .. } => write!(f, "I/O error on {}", path.display()),
            Self::Json(_) => write!(f, "Assessment file is not valid JSON"),
            Self::Chart(_) => write!(f, "Failed to render chart"),
            Self::Docx(_) => write!(f, "Failed to package DOCX document"),
            Self::Pdf(_) => write!(f, "Failed to render PDF document"),
            #[cfg(feature = "bookmarks")]
            Self::Bookmark(_) => write!(f, "Failed to embed PDF bookmarks"),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InputNotFound(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::Chart(err) => Some(err),
            Self::Docx(err) => Some(err.as_ref()),
            Self::Pdf(err) => Some(err),
            #[cfg(feature = "bookmarks")]
            Self::Bookmark(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

impl From<ChartError> for ReportError {
    fn from(err: ChartError) -> Self {
        Self::Chart(err)
    }
}

impl From<genpdf::error::Error> for ReportError {
    fn from(err: genpdf::error::Error) -> Self {
        Self::Pdf(err)
    }
}

#[cfg(feature = "bookmarks")]
impl From<BookmarkError> for ReportError {
    fn from(err: BookmarkError) -> Self {
        Self::Bookmark(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn io_errors_keep_their_path_and_source() {
        let err = ReportError::io(
            "/tmp/reporte.docx",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "I/O error on /tmp/reporte.docx");
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("denied"));
    }

    #[test]
    fn json_errors_convert() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ReportError::from(parse);
        assert!(matches!(err, ReportError::Json(_)));
        assert!(err.source().is_some());
    }
}
