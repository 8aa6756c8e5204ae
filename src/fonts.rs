//! Font discovery for the PDF renderer and the chart rasteriser.
//!
//! The search order is:
//!
//! 1. the directory named by `DEVOPS_REPORT_FONTS_DIR`,
//! 2. `assets/fonts` next to the running executable,
//! 3. `assets/fonts` inside this crate,
//!
//! each of which must hold the four Roboto faces.  When none does, system families are tried:
//! Windows Arial (`DEVOPS_REPORT_WINDOWS_FONTS_DIR` or `%WINDIR%\Fonts`), Liberation Sans and
//! DejaVu Sans.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Overrides the bundled font directory.
pub const FONTS_DIR_ENV: &str = "DEVOPS_REPORT_FONTS_DIR";
/// Overrides the Windows fonts directory used for the Arial fallback.
pub const WINDOWS_FONTS_DIR_ENV: &str = "DEVOPS_REPORT_WINDOWS_FONTS_DIR";

/// File names of one family, in regular, bold, italic, bold-italic order.
type FaceNames = [&'static str; 4];

const BUNDLED_FACES: FaceNames = [
    "Roboto-Regular.ttf",
    "Roboto-Bold.ttf",
    "Roboto-Italic.ttf",
    "Roboto-BoldItalic.ttf",
];

const WINDOWS_FACES: FaceNames = ["arial.ttf", "arialbd.ttf", "ariali.ttf", "arialbi.ttf"];

const LIBERATION_FACES: FaceNames = [
    "LiberationSans-Regular.ttf",
    "LiberationSans-Bold.ttf",
    "LiberationSans-Italic.ttf",
    "LiberationSans-BoldItalic.ttf",
];

const DEJAVU_FACES: FaceNames = [
    "DejaVuSans.ttf",
    "DejaVuSans-Bold.ttf",
    "DejaVuSans-Oblique.ttf",
    "DejaVuSans-BoldOblique.ttf",
];

const LINUX_FALLBACKS: &[(&str, &str, FaceNames)] = &[
    (
        "Liberation Sans",
        "/usr/share/fonts/truetype/liberation",
        LIBERATION_FACES,
    ),
    (
        "Liberation Sans",
        "/usr/share/fonts/liberation-sans",
        LIBERATION_FACES,
    ),
    ("DejaVu Sans", "/usr/share/fonts/truetype/dejavu", DEJAVU_FACES),
    ("DejaVu Sans", "/usr/share/fonts/dejavu", DEJAVU_FACES),
];

/// Paths of the four faces of one font family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontFiles {
    family: String,
    regular: PathBuf,
    bold: PathBuf,
    italic: PathBuf,
    bold_italic: PathBuf,
}

impl FontFiles {
    fn in_directory(family: &str, directory: &Path, faces: FaceNames) -> Self {
        Self {
            family: family.to_owned(),
            regular: directory.join(faces[0]),
            bold: directory.join(faces[1]),
            italic: directory.join(faces[2]),
            bold_italic: directory.join(faces[3]),
        }
    }

    /// Human-readable family name.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Path of the regular face.
    pub fn regular(&self) -> &Path {
        &self.regular
    }

    fn faces(&self) -> [(&Path, &'static str); 4] {
        [
            (&self.regular, "regular"),
            (&self.bold, "bold"),
            (&self.italic, "italic"),
            (&self.bold_italic, "bold italic"),
        ]
    }

    fn missing(&self) -> Vec<&Path> {
        self.faces()
            .into_iter()
            .map(|(path, _)| path)
            .filter(|path| !path.is_file())
            .collect()
    }

    /// Loads all four faces as a `genpdf` font family.
    pub fn load_family(&self) -> Result<FontFamily<FontData>, Error> {
        let load = |path: &Path, style: &str| {
            FontData::load(path, None).map_err(|err| {
                let io_kind = if path.is_file() {
                    io::ErrorKind::Other
                } else {
                    io::ErrorKind::NotFound
                };
                Error::new(
                    format!(
                        "Failed to load {} {} font at {}: {}",
                        self.family,
                        style,
                        path.display(),
                        err
                    ),
                    io::Error::new(io_kind, err.to_string()),
                )
            })
        };

        Ok(FontFamily {
            regular: load(&self.regular, "regular")?,
            bold: load(&self.bold, "bold")?,
            italic: load(&self.italic, "italic")?,
            bold_italic: load(&self.bold_italic, "bold italic")?,
        })
    }

    /// Regular and bold faces, the ones chart labels and titles are set in.
    pub fn upright_faces(&self) -> [&Path; 2] {
        [&self.regular, &self.bold]
    }
}

/// Location of the fonts shipped with the crate sources.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    let mut push = |candidate: PathBuf| {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    };

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            push(bin_dir.join("assets/fonts"));
        }
    }

    push(bundled_fonts_source_dir());
    candidates
}

fn resolve_bundled_fonts() -> Result<FontFiles, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        let files = FontFiles::in_directory(DEFAULT_FONT_FAMILY_NAME, &candidate, BUNDLED_FACES);
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }

        let missing = files.missing();
        if missing.is_empty() {
            return Ok(files);
        }

        let missing_list = missing
            .iter()
            .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
            .collect::<Vec<_>>()
            .join(", ");
        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.display(),
            missing_list
        ));
    }

    let summary = if attempts.is_empty() {
        "no search paths were available".to_owned()
    } else {
        attempts.join(", ")
    };

    Err(Error::new(
        format!(
            "Unable to locate bundled font directory. Checked: {}. Set {} to a directory holding the Roboto faces.",
            summary, FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "bundled fonts directory not found"),
    ))
}

fn windows_font_directory() -> Option<PathBuf> {
    if let Some(path) = env_path(WINDOWS_FONTS_DIR_ENV) {
        return Some(path);
    }

    #[cfg(windows)]
    {
        for var in ["WINDIR", "SystemRoot"] {
            if let Some(root) = env_path(var) {
                let candidate = root.join("Fonts");
                if candidate.is_dir() {
                    return Some(candidate);
                }
            }
        }
    }

    None
}

fn system_fallbacks() -> Vec<FontFiles> {
    let mut fallbacks = Vec::new();
    if let Some(directory) = windows_font_directory() {
        fallbacks.push(FontFiles::in_directory("Arial", &directory, WINDOWS_FACES));
    }
    fallbacks.extend(
        LINUX_FALLBACKS
            .iter()
            .map(|(family, directory, faces)| {
                FontFiles::in_directory(family, Path::new(directory), *faces)
            }),
    );
    fallbacks
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Resolves the font family to use: the bundled Roboto faces, else the first complete system
/// family.
pub fn resolve_font_files() -> Result<FontFiles, Error> {
    let err = match resolve_bundled_fonts() {
        Ok(files) => return Ok(files),
        Err(err) if fonts_missing(&err) => err,
        Err(err) => return Err(err),
    };

    match system_fallbacks()
        .into_iter()
        .find(|files| files.missing().is_empty())
    {
        Some(fallback) => {
            warn!(
                "Bundled fonts unavailable ({}); falling back to system '{}' family.",
                err,
                fallback.family()
            );
            Ok(fallback)
        }
        None => {
            debug!("No system font family found after: {}", err);
            Err(Error::new(
                format!("Bundled fonts unavailable and no system fallback found: {}", err),
                io::Error::new(io::ErrorKind::NotFound, "default fonts are not available"),
            ))
        }
    }
}

/// Returns the resolved font family as a `genpdf` font family definition.
pub fn default_font_family() -> Result<FontFamily<FontData>, Error> {
    resolve_font_files()?.load_family()
}

/// Indicates whether a usable font family (bundled or system) can be located.
pub fn default_fonts_available() -> bool {
    resolve_font_files().is_ok()
}
