//! Font discovery for the report.
//!
//! `genpdf` embeds TrueType fonts. The report prefers Liberation Sans, a
//! metric-compatible replacement for Helvetica, and falls back to DejaVu Sans,
//! which is checked into `assets/fonts`. Both families are looked up in the
//! following directories, first match wins:
//!
//! 1. `$PERSON_REPORT_FONTS_DIR`
//! 2. `assets/fonts` next to the running executable
//! 3. `assets/fonts` inside the crate
//!
//! When none of them holds a complete family the Windows Arial family is used
//! instead, taken from `$PERSON_REPORT_WINDOWS_FONTS_DIR` or `%WINDIR%\Fonts`.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

/// Name of the preferred font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "LiberationSans";

/// Name of the family shipped in `assets/fonts`.
pub const BUNDLED_FONT_FAMILY_NAME: &str = "DejaVuSans";

/// Overrides the bundled font directory.
pub const FONTS_DIR_ENV: &str = "PERSON_REPORT_FONTS_DIR";

/// Overrides the directory searched for the Windows fallback family.
pub const WINDOWS_FONTS_DIR_ENV: &str = "PERSON_REPORT_WINDOWS_FONTS_DIR";

/// File names of the four styles of one family.
#[derive(Clone, Copy, Debug)]
struct FamilyFiles {
    name: &'static str,
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

impl FamilyFiles {
    fn files(&self) -> [&'static str; 4] {
        [self.regular, self.bold, self.italic, self.bold_italic]
    }

    fn missing_in(&self, directory: &Path) -> Vec<&'static str> {
        self.files()
            .into_iter()
            .filter(|name| !directory.join(name).is_file())
            .collect()
    }

    fn load(&self, directory: &Path) -> Result<FontFamily<FontData>, Error> {
        Ok(FontFamily {
            regular: load_font_file(directory, self.regular, "regular")?,
            bold: load_font_file(directory, self.bold, "bold")?,
            italic: load_font_file(directory, self.italic, "italic")?,
            bold_italic: load_font_file(directory, self.bold_italic, "bold italic")?,
        })
    }
}

const REPORT_FAMILIES: [FamilyFiles; 2] = [
    FamilyFiles {
        name: DEFAULT_FONT_FAMILY_NAME,
        regular: "LiberationSans-Regular.ttf",
        bold: "LiberationSans-Bold.ttf",
        italic: "LiberationSans-Italic.ttf",
        bold_italic: "LiberationSans-BoldItalic.ttf",
    },
    FamilyFiles {
        name: BUNDLED_FONT_FAMILY_NAME,
        regular: "DejaVuSans.ttf",
        bold: "DejaVuSans-Bold.ttf",
        italic: "DejaVuSans-Oblique.ttf",
        bold_italic: "DejaVuSans-BoldOblique.ttf",
    },
];

const WINDOWS_FONT_FILES: FamilyFiles = FamilyFiles {
    name: "Arial",
    regular: "arial.ttf",
    bold: "arialbd.ttf",
    italic: "ariali.ttf",
    bold_italic: "arialbi.ttf",
};

/// Directory holding the fonts checked into the crate.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    let mut push_unique = |candidate: PathBuf| {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    };

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        push_unique(path);
    }

    if let Some(bin_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        push_unique(bin_dir.join("assets/fonts"));
    }

    push_unique(bundled_fonts_source_dir());
    candidates
}

fn resolve_font_directory() -> Result<(PathBuf, FamilyFiles), Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }

        for family in REPORT_FAMILIES {
            let missing = family.missing_in(&candidate);
            if missing.is_empty() {
                debug!("Using {} fonts from {}", family.name, candidate.display());
                return Ok((candidate, family));
            }
            attempts.push(format!(
                "{} ({} missing files [{}])",
                candidate.display(),
                family.name,
                missing.join(", ")
            ));
        }
    }

    Err(Error::new(
        format!(
            "Unable to locate the {} or {} font family. Checked: {}. Copy the fonts into assets/fonts or set {}.",
            DEFAULT_FONT_FAMILY_NAME,
            BUNDLED_FONT_FAMILY_NAME,
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "report fonts not found"),
    ))
}

fn load_report_font_family() -> Result<FontFamily<FontData>, Error> {
    let (directory, family) = resolve_font_directory()?;
    family.load(&directory)
}

fn windows_font_directory() -> Option<PathBuf> {
    if let Some(path) = env_path(WINDOWS_FONTS_DIR_ENV) {
        return Some(path);
    }

    ["WINDIR", "SystemRoot"]
        .iter()
        .filter_map(|var| env_path(var))
        .map(|root| root.join("Fonts"))
        .find(|candidate| cfg!(windows) && candidate.is_dir())
}

fn load_font_file(directory: &Path, file: &str, style: &str) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!(
                "Failed to load {} font at {}: {}",
                style,
                path.display(),
                err
            ),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

fn windows_fallback_font_family() -> Result<FontFamily<FontData>, Error> {
    let directory = windows_font_directory().ok_or_else(|| {
        Error::new(
            "Windows font directory not found for fallback",
            io::Error::new(io::ErrorKind::NotFound, "windows fonts directory not found"),
        )
    })?;

    WINDOWS_FONT_FILES.load(&directory)
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Loads the report font family, falling back to Windows Arial when neither
/// report family can be found.
pub fn default_font_family() -> Result<FontFamily<FontData>, Error> {
    match load_report_font_family() {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => match windows_fallback_font_family() {
            Ok(fallback) => {
                warn!(
                    "Report fonts unavailable ({}); falling back to Windows '{}' family.",
                    err, WINDOWS_FONT_FILES.name
                );
                Ok(fallback)
            }
            Err(fallback_err) => Err(Error::new(
                format!("{}; Windows fallback failed: {}", err, fallback_err),
                io::Error::new(io::ErrorKind::NotFound, "report fonts are not available"),
            )),
        },
        Err(err) => Err(err),
    }
}

/// Whether a report family can be found without the Windows fallback.
pub fn default_fonts_available() -> bool {
    resolve_font_directory().is_ok()
}
