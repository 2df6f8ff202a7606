//! Custom `genpdf` elements used by the report.
//!
//! `genpdf` has no notion of cell backgrounds, fixed row heights or absolutely
//! positioned overlays, so the report brings its own elements for those:
//! [`ReportCell`] for the table and [`Masthead`] for the title block on the
//! first page. The module also holds the image helpers that decode assets with
//! the [`image`] crate and prepare them for embedding.

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use image::{DynamicImage, GenericImageView, ImageBuffer, Rgb};

use genpdf::elements::Image;
use genpdf::error::{Context as _, Error};
use genpdf::style::{Color, Style};
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Scale, Size};
use log::debug;

use crate::format::{mm_from_f64, mm_to_f64, points, RowShade, MM_PER_INCH};

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const CELL_PADDING_PT: f64 = 2.0;
const CELL_RULE_PT: f64 = 1.0;
const LINK_LEADING: f64 = 1.5;

fn estimated_image_size(image: &DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

/// Loads an image from the given path using the [`image`] crate with descriptive errors.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

/// Decodes the image at `path`, or returns `None` when there is no such file.
pub fn load_optional_image(path: impl AsRef<Path>) -> Result<Option<DynamicImage>, Error> {
    let path = path.as_ref();
    if !path.is_file() {
        debug!("Image {} not found; skipping", path.display());
        return Ok(None);
    }
    decode_image_from_path(path).map(Some)
}

/// Composites a transparent image onto an opaque background color.
///
/// The PDF backend rejects images with an alpha channel.
pub fn flatten_onto(image: &DynamicImage, background: [u8; 3]) -> DynamicImage {
    if !image.color().has_alpha() {
        return image.clone();
    }

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let buffer = ImageBuffer::from_fn(width, height, |x, y| {
        let pixel = rgba.get_pixel(x, y).0;
        let alpha = pixel[3] as u16;
        let mut channels = [0u8; 3];
        for (index, channel) in channels.iter_mut().enumerate() {
            let over = pixel[index] as u16 * alpha;
            let under = background[index] as u16 * (255 - alpha);
            *channel = ((over + under + 127) / 255) as u8;
        }
        Rgb(channels)
    });
    DynamicImage::ImageRgb8(buffer)
}

/// Uniform scale factor that fits `natural` into `width` × `height`.
pub fn scale_to_fit(natural: Size, width: Mm, height: Mm) -> f64 {
    let natural_width = mm_to_f64(natural.width);
    let natural_height = mm_to_f64(natural.height);
    if natural_width <= f64::EPSILON || natural_height <= f64::EPSILON {
        return 1.0;
    }
    (mm_to_f64(width) / natural_width).min(mm_to_f64(height) / natural_height)
}

/// A one-pixel image of `rgb` stretched over `size`, anchored at the top-left
/// corner of the area it is rendered into.
///
/// `genpdf` can only stroke lines, so filled rectangles are drawn as images.
pub fn solid_fill(rgb: [u8; 3], size: Size) -> Result<Image, Error> {
    let pixel = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(1, 1, Rgb(rgb)));
    let natural = estimated_image_size(&pixel, DEFAULT_IMAGE_DPI);
    let scale = Scale::new(
        mm_to_f64(size.width) / mm_to_f64(natural.width),
        mm_to_f64(size.height) / mm_to_f64(natural.height),
    );
    Ok(Image::from_dynamic_image(pixel)?
        .with_scale(scale)
        .with_position(Position::default()))
}

/// An image prepared for embedding, together with its rendered size.
pub struct PlacedImage {
    image: Image,
    size: Size,
}

impl PlacedImage {
    /// Flattens `source` onto `background` and scales it to fit the given box.
    pub fn fit(
        source: &DynamicImage,
        background: [u8; 3],
        width: Mm,
        height: Mm,
    ) -> Result<Self, Error> {
        let flattened = flatten_onto(source, background);
        let natural = estimated_image_size(&flattened, DEFAULT_IMAGE_DPI);
        let scale = scale_to_fit(natural, width, height);
        let image = Image::from_dynamic_image(flattened)?.with_scale(Scale::new(scale, scale));
        let size = Size::new(natural.width * scale, natural.height * scale);
        Ok(Self { image, size })
    }

    /// Scales `source` to `height`, keeping its aspect ratio.
    pub fn with_height(
        source: &DynamicImage,
        background: [u8; 3],
        height: Mm,
    ) -> Result<Self, Error> {
        let (px_width, px_height) = source.dimensions();
        let ratio = if px_height == 0 {
            1.0
        } else {
            px_width as f64 / px_height as f64
        };
        Self::fit(source, background, height * ratio, height)
    }

    /// Rendered size after scaling.
    pub fn size(&self) -> Size {
        self.size
    }
}

/// Content of a single table cell.
pub enum CellContent {
    /// One line of text.
    Text {
        /// Text to print.
        text: String,
        /// Style merged over the document style.
        style: Style,
        /// Horizontal alignment inside the cell.
        alignment: Alignment,
    },
    /// A centered image.
    Image(PlacedImage),
    /// Nothing but the background.
    Empty,
}

impl CellContent {
    /// Plain text cell.
    pub fn text(text: impl Into<String>, alignment: Alignment) -> Self {
        Self::Text {
            text: text.into(),
            style: Style::new(),
            alignment,
        }
    }

    /// Bold text cell.
    pub fn bold(text: impl Into<String>, alignment: Alignment) -> Self {
        Self::Text {
            text: text.into(),
            style: Style::new().bold(),
            alignment,
        }
    }
}

/// A fixed-height table cell with a row background and a bottom rule.
///
/// The cell never splits across pages: when the remaining area is shorter
/// than the cell it renders nothing and asks for a new page.
pub struct ReportCell {
    content: CellContent,
    shade: RowShade,
    height: Mm,
}

impl ReportCell {
    /// Creates a cell of `height` shaded for its row.
    pub fn new(content: CellContent, shade: RowShade, height: Mm) -> Self {
        Self {
            content,
            shade,
            height,
        }
    }

    /// The row shade this cell was built with.
    pub fn shade(&self) -> RowShade {
        self.shade
    }

    /// Whether the cell holds an image.
    pub fn has_image(&self) -> bool {
        matches!(self.content, CellContent::Image(_))
    }

    fn fill_background(
        &self,
        context: &genpdf::Context,
        area: &render::Area<'_>,
        style: Style,
    ) -> Result<(), Error> {
        if !self.shade.is_filled() {
            return Ok(());
        }
        let size = Size::new(area.size().width, self.height);
        let mut band = solid_fill(self.shade.rgb(), size)?;
        band.render(context, area.clone(), style)?;
        Ok(())
    }

    fn draw_rule(&self, area: &render::Area<'_>) {
        // PDF's default line width is 1pt.
        let y = self.height - points(CELL_RULE_PT) / 2.0;
        area.draw_line(
            vec![Position::new(0, y), Position::new(area.size().width, y)],
            Style::new().with_color(Color::Rgb(0, 0, 0)),
        );
    }
}

impl Element for ReportCell {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        if area.size().height < self.height {
            result.has_more = true;
            return Ok(result);
        }

        self.fill_background(context, &area, style)?;

        let width = area.size().width;
        match &mut self.content {
            CellContent::Text {
                text,
                style: text_style,
                alignment,
            } => {
                let style = style.and(*text_style);
                let padding = points(CELL_PADDING_PT);
                let text_width = style.str_width(&context.font_cache, text.as_str());
                let x = match alignment {
                    Alignment::Left => padding,
                    Alignment::Center => (width - text_width) / 2.0,
                    Alignment::Right => width - text_width - padding,
                };
                let glyph_height = style
                    .font(&context.font_cache)
                    .glyph_height(style.font_size());
                let y = (self.height - glyph_height) / 2.0;
                let position = Position::new(x, y);
                if !area.print_str(&context.font_cache, position, style, text.as_str())? {
                    debug!("Cell text `{}` does not fit into its cell", text);
                }
            }
            CellContent::Image(placed) => {
                let mut image_area = area.clone();
                let offset = (self.height - placed.size.height) / 2.0;
                image_area.add_offset(Position::new(0, offset));
                placed.image.set_alignment(Alignment::Center);
                placed.image.render(context, image_area, style)?;
            }
            CellContent::Empty => {}
        }

        self.draw_rule(&area);

        result.size = Size::new(width, self.height);
        Ok(result)
    }
}

/// Page-relative rectangle of the rendered link text, in millimetres from the
/// top-left corner of the page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkArea {
    /// Distance from the left page edge.
    pub left: Mm,
    /// Distance from the top page edge.
    pub top: Mm,
    /// Width of the link text.
    pub width: Mm,
    /// Height of the text line.
    pub height: Mm,
}

/// Hyperlink text printed under the logo.
pub struct MastheadLink {
    text: String,
    style: Style,
    top: Mm,
    placed: Rc<Cell<Option<LinkArea>>>,
}

impl MastheadLink {
    /// Creates a right-aligned link line in a box whose top edge is `top`
    /// below the content origin. The text sits on the first baseline of the box.
    pub fn new(text: impl Into<String>, style: Style, top: Mm) -> Self {
        Self {
            text: text.into(),
            style,
            top,
            placed: Rc::new(Cell::new(None)),
        }
    }

    /// Handle that receives the page position of the text once it is drawn.
    pub fn placement(&self) -> Rc<Cell<Option<LinkArea>>> {
        Rc::clone(&self.placed)
    }
}

/// Title block of the first page: title line, logo and link text.
///
/// Only the title takes up vertical space. The logo and link are drawn over
/// the right side of the title block at fixed offsets from the top margin.
pub struct Masthead {
    title: String,
    title_style: Style,
    blank_lines: usize,
    spacing_after: Mm,
    origin: Position,
    logo: Option<(PlacedImage, Mm)>,
    link: Option<MastheadLink>,
}

impl Masthead {
    /// Creates a masthead whose content area starts at `origin` on the page.
    pub fn new(title: impl Into<String>, title_style: Style, origin: Position) -> Self {
        Self {
            title: title.into(),
            title_style,
            blank_lines: 0,
            spacing_after: Mm::default(),
            origin,
            logo: None,
            link: None,
        }
    }

    /// Adds empty title-sized lines below the title.
    pub fn with_blank_lines(mut self, blank_lines: usize) -> Self {
        self.blank_lines = blank_lines;
        self
    }

    /// Adds spacing below the block.
    pub fn with_spacing_after(mut self, spacing: Mm) -> Self {
        self.spacing_after = spacing;
        self
    }

    /// Places the logo flush right with its top edge `top` below the origin.
    pub fn with_logo(mut self, logo: PlacedImage, top: Mm) -> Self {
        self.logo = Some((logo, top));
        self
    }

    /// Adds the link line.
    pub fn with_link(mut self, link: MastheadLink) -> Self {
        self.link = Some(link);
        self
    }
}

impl Element for Masthead {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let width = area.size().width;

        let title_style = style.and(self.title_style);
        let line_height = title_style.line_height(&context.font_cache);
        if !area.print_str(&context.font_cache, Position::default(), title_style, &self.title)? {
            result.has_more = true;
            return Ok(result);
        }

        if let Some((logo, top)) = self.logo.as_mut() {
            let x = width - logo.size.width;
            logo.image.set_position(Position::new(x, *top));
            logo.image.render(context, area.clone(), style)?;
        }

        if let Some(link) = &self.link {
            let link_style = style.and(link.style);
            let text_width = link_style.str_width(&context.font_cache, &link.text);
            let glyph_height = link_style
                .font(&context.font_cache)
                .glyph_height(link_style.font_size());
            let baseline = link.top + points(f64::from(link_style.font_size()) * LINK_LEADING);
            let position = Position::new(width - text_width, baseline - glyph_height);
            area.print_str(&context.font_cache, position, link_style, &link.text)?;
            link.placed.set(Some(LinkArea {
                left: self.origin.x + position.x,
                top: self.origin.y + position.y,
                width: text_width,
                height: link_style.line_height(&context.font_cache),
            }));
        }

        let lines = 1 + self.blank_lines;
        result.size = Size::new(width, line_height * lines as f64 + self.spacing_after);
        Ok(result)
    }
}
