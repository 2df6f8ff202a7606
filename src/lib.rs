//! Core entry point for the person_report crate.
//!
//! Loads person records from JSON and renders them as a paginated PDF table
//! with a masthead, banded rows, status icons and page footers.

pub mod builder;
pub mod config;
pub mod decorator;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod format;
#[cfg(feature = "hyperlink")]
pub mod hyperlink;
pub mod loader;
pub mod model;
pub mod viewer;

pub use builder::{RenderedReport, ReportBuilder};
pub use config::ReportConfig;
pub use error::{ReportError, Result};
pub use format::Locale;
pub use loader::load_people;
pub use model::{Person, Profession};
