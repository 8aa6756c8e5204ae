//! Compiles DevOps maturity assessment payloads into DOCX (and optionally PDF) reports.
//!
//! The pipeline is: [`assessment`] reads the JSON payload, [`compiler`] maps it onto the
//! renderer-independent [`model`] (drawing charts through [`charts`]), and [`docx`] or [`pdf`]
//! serialises the result.  [`text_pdf`] is a small companion that paginates plain text.

pub mod assessment;
pub mod builder;
pub mod charts;
pub mod compiler;
pub mod docx;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod model;
pub mod palette;
pub mod pdf;
pub mod richtext;
pub mod scoring;
pub mod text_pdf;

#[cfg(feature = "bookmarks")]
pub mod bookmarks;

pub use compiler::{generate, CompiledReport, GenerateOptions, GeneratedFiles, ReportCompiler};
pub use error::ReportError;
