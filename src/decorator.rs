//! Page decorator that applies the report margins and draws the footer.

use std::cell::Cell;
use std::rc::Rc;

use genpdf::error::Error;
use genpdf::render::Area;
use genpdf::style::Style;
use genpdf::{Context, Margins, Mm, PageDecorator, Position};
use log::debug;

use crate::format;

/// Font size of both footer lines, in points.
pub const FOOTER_FONT_SIZE: u8 = 8;

/// Footer baseline height as a fraction of the bottom margin.
pub const FOOTER_BASELINE_RATIO: f64 = 0.75;

/// Page margins of the report. Left and right are equal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageMargins {
    /// Distance from the top page edge to the content.
    pub top: Mm,
    /// Distance from the left and right page edges to the content.
    pub side: Mm,
    /// Distance from the bottom page edge to the content.
    pub bottom: Mm,
}

impl PageMargins {
    /// The margins in the form `genpdf` applies to an area.
    pub fn to_margins(self) -> Margins {
        Margins::trbl(self.top, self.side, self.bottom, self.side)
    }

    /// Top-left corner of the content area on the page.
    pub fn content_origin(self) -> Position {
        Position::new(self.side, self.top)
    }
}

/// Pages decorated and footers printed so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FooterProgress {
    /// Pages handed to the decorator.
    pub pages: usize,
    /// Pages whose footer texts both fit on the page.
    pub footers_drawn: usize,
}

/// Draws "generated on" and "page K of N" at the bottom of every page.
///
/// `genpdf` hands the decorator the full page area before any content is laid
/// out. The decorator counts pages, paints the footer into the bottom margin
/// and returns the area shrunk by the page margins for the content.
pub struct FooterDecorator {
    total_pages: usize,
    margins: PageMargins,
    generated_on: String,
    progress: Rc<Cell<FooterProgress>>,
}

impl FooterDecorator {
    /// Creates a decorator for a document with `total_pages` pages.
    pub fn new(margins: PageMargins, total_pages: usize, generated_on: impl Into<String>) -> Self {
        Self {
            total_pages,
            margins,
            generated_on: generated_on.into(),
            progress: Rc::new(Cell::new(FooterProgress::default())),
        }
    }

    /// Handle that keeps reporting progress after the decorator is moved
    /// into a document.
    pub fn progress(&self) -> Rc<Cell<FooterProgress>> {
        Rc::clone(&self.progress)
    }

    /// Number of pages decorated so far.
    pub fn pages_seen(&self) -> usize {
        self.progress.get().pages
    }

    /// Left and right footer texts for the given 1-based page.
    pub fn footer_texts(&self, page: usize) -> (String, String) {
        (
            self.generated_on.clone(),
            format::page_label(page, self.total_pages),
        )
    }

    /// Top of the footer text box for a page of `page_height`.
    ///
    /// `genpdf` puts the first baseline one glyph height below the position it
    /// prints at, so the box starts one glyph height above the baseline.
    pub fn footer_top(&self, page_height: Mm, glyph_height: Mm) -> Mm {
        page_height - self.margins.bottom * FOOTER_BASELINE_RATIO - glyph_height
    }

    fn draw_footer(
        &self,
        page: usize,
        context: &Context,
        area: &Area<'_>,
        style: Style,
    ) -> Result<bool, Error> {
        let style = style.and(Style::new().with_font_size(FOOTER_FONT_SIZE));
        let page_size = area.size();
        let glyph_height = style
            .font(&context.font_cache)
            .glyph_height(style.font_size());
        let top = self.footer_top(page_size.height, glyph_height);

        let (generated, page_label) = self.footer_texts(page);

        let left_fits = area.print_str(
            &context.font_cache,
            Position::new(self.margins.side, top),
            style,
            &generated,
        )?;

        let label_width = style.str_width(&context.font_cache, &page_label);
        let right_edge = page_size.width - self.margins.side;
        let right_fits = area.print_str(
            &context.font_cache,
            Position::new(right_edge - label_width, top),
            style,
            &page_label,
        )?;

        if !(left_fits && right_fits) {
            debug!("Footer of page {} did not fit into the page area", page);
        }
        Ok(left_fits && right_fits)
    }
}

impl PageDecorator for FooterDecorator {
    fn decorate_page<'a>(
        &mut self,
        context: &Context,
        mut area: Area<'a>,
        style: Style,
    ) -> Result<Area<'a>, Error> {
        let mut progress = self.progress.get();
        progress.pages += 1;
        if progress.pages > self.total_pages {
            debug!(
                "Layout produced page {} beyond the estimated {} pages",
                progress.pages, self.total_pages
            );
        }

        if self.draw_footer(progress.pages, context, &area, style)? {
            progress.footers_drawn += 1;
        }
        self.progress.set(progress);

        area.add_margins(self.margins.to_margins());
        Ok(area)
    }
}
