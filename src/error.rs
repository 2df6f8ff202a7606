//! Error type shared by the report pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while loading people or rendering the report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Reading an input file or writing the rendered PDF failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File that was being read or written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The people file is not a valid JSON array of person records.
    #[error("Failed to parse {path}: {source}")]
    Json {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The bundled or fallback fonts could not be loaded.
    #[error("Failed to load fonts: {0}")]
    FontLoad(#[source] genpdf::error::Error),

    /// An image asset exists but could not be decoded.
    #[error("Failed to load image {path}: {source}")]
    Image {
        /// Asset that failed to decode.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: genpdf::error::Error,
    },

    /// Laying out or serializing the document failed.
    #[error("Failed to render PDF: {0}")]
    Pdf(#[from] genpdf::error::Error),

    /// The link annotation could not be added to the rendered document.
    #[error("Failed to annotate PDF: {0}")]
    Annotation(String),
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(feature = "hyperlink")]
impl From<lopdf::Error> for ReportError {
    fn from(err: lopdf::Error) -> Self {
        Self::Annotation(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReportError>;
