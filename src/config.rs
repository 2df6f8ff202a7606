//! Report configuration.

use std::env;
use std::path::{Path, PathBuf};

use crate::format::Locale;

/// Records rendered when no limit is configured.
pub const DEFAULT_MAX_RECORDS: usize = 1000;

/// Logo drawn in the top-right corner of the first page.
pub const LOGO_IMAGE: &str = "img/youtube.png";

/// Icon shown for employed people.
pub const EMPLOYED_ICON: &str = "img/emoji_feliz.png";

/// Icon shown for people without a job.
pub const UNEMPLOYED_ICON: &str = "img/emoji_triste.png";

/// Settings for a single report run.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportConfig {
    /// Directory that holds the `img/` assets.
    pub assets_dir: PathBuf,
    /// Directory the PDF is written to.
    pub output_dir: PathBuf,
    /// Currency formatting for the salary column.
    pub locale: Locale,
    /// Maximum number of people included, in file order.
    pub max_records: usize,
    /// Whether the finished file is handed to the system viewer.
    pub open_viewer: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            assets_dir: executable_dir(),
            output_dir: PathBuf::from("."),
            locale: Locale::default(),
            max_records: DEFAULT_MAX_RECORDS,
            open_viewer: true,
        }
    }
}

impl ReportConfig {
    /// Sets the assets directory and returns the updated configuration.
    pub fn with_assets_dir(mut self, assets_dir: impl Into<PathBuf>) -> Self {
        self.assets_dir = assets_dir.into();
        self
    }

    /// Sets the output directory and returns the updated configuration.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Sets the currency locale and returns the updated configuration.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Sets the record limit and returns the updated configuration.
    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records;
        self
    }

    /// Enables or disables the viewer launch and returns the updated configuration.
    pub fn with_open_viewer(mut self, open_viewer: bool) -> Self {
        self.open_viewer = open_viewer;
        self
    }

    /// Absolute location of an asset relative to [`ReportConfig::assets_dir`].
    pub fn asset(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.assets_dir.join(relative)
    }

    /// Location of the logo image.
    pub fn logo_path(&self) -> PathBuf {
        self.asset(LOGO_IMAGE)
    }

    /// Location of the icon matching the employment flag.
    pub fn status_icon_path(&self, employed: bool) -> PathBuf {
        self.asset(if employed {
            EMPLOYED_ICON
        } else {
            UNEMPLOYED_ICON
        })
    }
}

/// Directory of the running executable, or the working directory when it
/// cannot be determined.
pub fn executable_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
