//! Assembles the person report.
//!
//! [`ReportBuilder`] takes the configured number of people, estimates the page
//! count for the footer, lays out the masthead and the table with `genpdf`,
//! annotates the link with `lopdf` and writes the file.

use std::cell::Cell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use chrono::{Local, NaiveDateTime};
use genpdf::elements::TableLayout;
use genpdf::style::{Color, Style};
use genpdf::{Alignment, Element, PaperSize};
use image::DynamicImage;
use log::{debug, info, warn};

use crate::config::ReportConfig;
use crate::decorator::{FooterDecorator, PageMargins};
use crate::elements::{
    load_optional_image, CellContent, LinkArea, Masthead, MastheadLink, PlacedImage, ReportCell,
};
use crate::error::{ReportError, Result};
use crate::fonts;
use crate::format::{self, layout_mm_to_points, points, RowShade};
use crate::model::Person;
use crate::viewer;

/// Title printed at the top of the first page.
pub const REPORT_TITLE: &str = "Person Report";

/// Text of the link printed under the logo.
pub const LINK_TEXT: &str = "Canal do Professor Ricardo Maroquio";

/// Target of the link printed under the logo.
pub const LINK_URL: &str = "https://www.youtube.com/maroquio";

/// Relative column widths, scaled from 0.6 : 2 : 1.5 : 1 : 1.
pub const COLUMN_WEIGHTS: [usize; 5] = [6, 20, 15, 10, 10];

/// Header labels with their alignment.
pub const COLUMN_HEADERS: [(&str, Alignment); 5] = [
    ("Code", Alignment::Center),
    ("Name", Alignment::Left),
    ("Profession", Alignment::Center),
    ("Salary", Alignment::Center),
    ("Employed", Alignment::Center),
];

const SIDE_MARGIN_MM: f64 = 15.0;
const BOTTOM_MARGIN_MM: f64 = 20.0;
const TITLE_FONT_SIZE: u8 = 32;
const TITLE_BLANK_LINES: usize = 2;
const TITLE_SPACING_AFTER_PT: f64 = 4.0;
const LOGO_HEIGHT_PT: f64 = 32.0;
const LOGO_BOTTOM_PT: f64 = 54.0;
const LINK_FONT_SIZE: u8 = 10;
const LINK_BOX_TOP_MM: f64 = 18.0;
const LINK_COLOR: Color = Color::Rgb(0, 0, 255);
const CELL_FONT_SIZE: u8 = 12;
const CELL_HEIGHT_PT: f64 = 25.0;
const ICON_SIZE_PT: f64 = 20.0;

/// A rendered report that has not been written yet.
pub struct RenderedReport {
    /// PDF contents.
    pub bytes: Vec<u8>,
    /// Page count printed in the footers.
    pub total_pages: usize,
    /// Pages the layout actually produced.
    pub pages_rendered: usize,
    /// File name derived from the generation timestamp.
    pub file_name: String,
}

/// Page margins, converted from layout millimetres.
pub fn report_margins() -> PageMargins {
    let side = points(layout_mm_to_points(SIDE_MARGIN_MM));
    PageMargins {
        top: side,
        side,
        bottom: points(layout_mm_to_points(BOTTOM_MARGIN_MM)),
    }
}

/// Decoded status icons, loaded once per report.
pub struct StatusIcons {
    employed: Option<DynamicImage>,
    unemployed: Option<DynamicImage>,
}

impl StatusIcons {
    /// Loads both icons from the configured assets directory; missing files
    /// are tolerated.
    pub fn load(config: &ReportConfig) -> Result<Self> {
        Ok(Self {
            employed: load_asset(config.status_icon_path(true))?,
            unemployed: load_asset(config.status_icon_path(false))?,
        })
    }

    fn cell_content(&self, employed: bool, shade: RowShade) -> Result<CellContent> {
        let icon = if employed {
            &self.employed
        } else {
            &self.unemployed
        };
        match icon {
            Some(icon) => {
                let size = points(ICON_SIZE_PT);
                let placed = PlacedImage::fit(icon, shade.rgb(), size, size)?;
                Ok(CellContent::Image(placed))
            }
            None => Ok(CellContent::Empty),
        }
    }
}

fn load_asset(path: PathBuf) -> Result<Option<DynamicImage>> {
    load_optional_image(&path).map_err(|source| ReportError::Image { path, source })
}

fn cell(content: CellContent, row_index: usize) -> ReportCell {
    ReportCell::new(content, RowShade::for_row(row_index), points(CELL_HEIGHT_PT))
}

/// Bold header row; it is table row `0`.
pub fn header_row() -> Vec<ReportCell> {
    COLUMN_HEADERS
        .iter()
        .map(|(label, alignment)| cell(CellContent::bold(*label, *alignment), 0))
        .collect()
}

/// Cells for `person`, shaded for table row `row_index`.
pub fn person_row(
    person: &Person,
    row_index: usize,
    icons: &StatusIcons,
    locale: format::Locale,
) -> Result<Vec<ReportCell>> {
    let shade = RowShade::for_row(row_index);
    Ok(vec![
        cell(CellContent::text(person.code(), Alignment::Center), row_index),
        cell(CellContent::text(person.full_name(), Alignment::Left), row_index),
        cell(
            CellContent::bold(person.profession_name(), Alignment::Center),
            row_index,
        ),
        cell(
            CellContent::text(locale.format_currency(person.salary), Alignment::Right),
            row_index,
        ),
        cell(icons.cell_content(person.employed, shade)?, row_index),
    ])
}

/// Builds and writes the person report.
pub struct ReportBuilder {
    config: ReportConfig,
    generated_at: NaiveDateTime,
}

impl ReportBuilder {
    /// Creates a builder stamped with the current local time.
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            generated_at: Local::now().naive_local(),
        }
    }

    /// Overrides the generation timestamp and returns the updated builder.
    pub fn with_generated_at(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Name of the file this builder writes.
    pub fn file_name(&self) -> String {
        format::report_file_name(self.generated_at)
    }

    /// The first `max_records` people, in input order.
    pub fn select<'p>(&self, people: &'p [Person]) -> &'p [Person] {
        &people[..people.len().min(self.config.max_records)]
    }

    /// All table rows, header first.
    pub fn table_rows(&self, people: &[Person]) -> Result<Vec<Vec<ReportCell>>> {
        let icons = StatusIcons::load(&self.config)?;
        let mut rows = Vec::with_capacity(people.len() + 1);
        rows.push(header_row());
        for (index, person) in people.iter().enumerate() {
            rows.push(person_row(person, index + 1, &icons, self.config.locale)?);
        }
        Ok(rows)
    }

    /// Renders the report into memory.
    ///
    /// Returns `None` when the selection is empty.
    pub fn render(&self, people: &[Person]) -> Result<Option<RenderedReport>> {
        let selected = self.select(people);
        let Some(total_pages) = format::page_count(selected.len()) else {
            info!("No people selected; skipping report");
            return Ok(None);
        };
        debug!(
            "Rendering {} people on an estimated {} pages",
            selected.len(),
            total_pages
        );

        let font_family = fonts::default_font_family().map_err(ReportError::FontLoad)?;
        let mut document = genpdf::Document::new(font_family);
        document.set_title(REPORT_TITLE);
        document.set_paper_size(PaperSize::A4);
        document.set_font_size(CELL_FONT_SIZE);

        let margins = report_margins();
        let decorator = FooterDecorator::new(
            margins,
            total_pages,
            format::generated_on(self.generated_at),
        );
        let progress = decorator.progress();
        document.set_page_decorator(decorator);

        let (masthead, link_placement) = self.masthead(margins)?;
        document.push(masthead);

        let mut table = TableLayout::new(COLUMN_WEIGHTS.to_vec());
        for row in self.table_rows(selected)? {
            table.push_row(
                row.into_iter()
                    .map(|cell| Box::new(cell) as Box<dyn Element>)
                    .collect(),
            )?;
        }
        document.push(table);

        let mut bytes = Vec::new();
        document.render(&mut bytes)?;
        let bytes = annotate_link(bytes, link_placement.get())?;

        let pages_rendered = progress.get().pages;
        if pages_rendered != total_pages {
            warn!(
                "Footers announce {} pages but the layout produced {}",
                total_pages, pages_rendered
            );
        }

        Ok(Some(RenderedReport {
            bytes,
            total_pages,
            pages_rendered,
            file_name: self.file_name(),
        }))
    }

    /// Renders the report, writes it to the output directory and opens it when
    /// configured to.
    ///
    /// Returns the path of the written file, or `None` when nothing was selected.
    pub fn generate(&self, people: &[Person]) -> Result<Option<PathBuf>> {
        let Some(report) = self.render(people)? else {
            return Ok(None);
        };

        let path = self.config.output_dir.join(&report.file_name);
        fs::write(&path, &report.bytes).map_err(|err| ReportError::io(&path, err))?;
        info!(
            "Wrote {} ({} bytes, {} pages)",
            path.display(),
            report.bytes.len(),
            report.total_pages
        );

        if self.config.open_viewer && path.exists() {
            viewer::open_in_viewer(&path);
        }
        Ok(Some(path))
    }

    fn masthead(
        &self,
        margins: PageMargins,
    ) -> Result<(Masthead, Rc<Cell<Option<LinkArea>>>)> {
        let title_style = Style::new().with_font_size(TITLE_FONT_SIZE);
        let mut masthead = Masthead::new(REPORT_TITLE, title_style, margins.content_origin())
            .with_blank_lines(TITLE_BLANK_LINES)
            .with_spacing_after(points(TITLE_SPACING_AFTER_PT));

        if let Some(logo) = load_asset(self.config.logo_path())? {
            let placed = PlacedImage::with_height(
                &logo,
                RowShade::White.rgb(),
                points(LOGO_HEIGHT_PT),
            )?;
            let top = points(LOGO_BOTTOM_PT) - placed.size().height;
            masthead = masthead.with_logo(placed, top);
        }

        let link_style = Style::new()
            .with_font_size(LINK_FONT_SIZE)
            .with_color(LINK_COLOR);
        let link_top = points(layout_mm_to_points(LINK_BOX_TOP_MM));
        let link = MastheadLink::new(LINK_TEXT, link_style, link_top);
        let placement = link.placement();

        Ok((masthead.with_link(link), placement))
    }
}

#[cfg(feature = "hyperlink")]
fn annotate_link(bytes: Vec<u8>, placement: Option<LinkArea>) -> Result<Vec<u8>> {
    use crate::hyperlink::{apply_uri_links, UriLink};
    use genpdf::Size;

    match placement {
        Some(area) => {
            let link = UriLink::from_area(1, area, Size::from(PaperSize::A4), LINK_URL);
            apply_uri_links(&bytes, &[link])
        }
        None => Ok(bytes),
    }
}

#[cfg(not(feature = "hyperlink"))]
fn annotate_link(bytes: Vec<u8>, _placement: Option<LinkArea>) -> Result<Vec<u8>> {
    debug!("Built without the `hyperlink` feature; link text is not clickable");
    Ok(bytes)
}
