//! URI link annotations added to rendered PDFs with `lopdf`.
//!
//! `genpdf` prints text but cannot attach actions to it. Once the document is
//! rendered the bytes are reopened with `lopdf` and a `/Link` annotation with a
//! `/URI` action is placed over the printed link text.

use lopdf::{Dictionary, Document, Object};

use crate::elements::LinkArea;
use crate::error::{ReportError, Result};
use crate::format::to_points;
use genpdf::Size;

/// A clickable rectangle on one page.
#[derive(Clone, Debug, PartialEq)]
pub struct UriLink {
    /// 1-based page number.
    pub page: u32,
    /// Rectangle in PDF user space: `[left, bottom, right, top]` in points.
    pub rect: [f64; 4],
    /// Target of the link.
    pub uri: String,
}

impl UriLink {
    /// Builds a link from a top-left based area measured on a page of `page_size`.
    pub fn from_area(page: u32, area: LinkArea, page_size: Size, uri: impl Into<String>) -> Self {
        let page_height = to_points(page_size.height);
        let left = to_points(area.left);
        let top = page_height - to_points(area.top);
        let right = left + to_points(area.width);
        let bottom = top - to_points(area.height);
        Self {
            page,
            rect: [left, bottom, right, top],
            uri: uri.into(),
        }
    }
}

/// Appends a `/Link` annotation for every entry of `links` to the PDF in `pdf_bytes`.
///
/// The bytes are returned unchanged when `links` is empty.
pub fn apply_uri_links(pdf_bytes: &[u8], links: &[UriLink]) -> Result<Vec<u8>> {
    if links.is_empty() {
        return Ok(pdf_bytes.to_vec());
    }

    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();

    for link in links {
        let page_id = pages.get(&link.page).copied().ok_or_else(|| {
            ReportError::Annotation(format!(
                "link to {} refers to missing page {}",
                link.uri, link.page
            ))
        })?;

        let annotation_id = document.add_object(annotation_dictionary(link));

        let page = document
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|_| {
                ReportError::Annotation(format!("page {} is not a dictionary", link.page))
            })?;

        let mut annotations = match page.get(b"Annots") {
            Ok(Object::Array(existing)) => existing.clone(),
            _ => Vec::new(),
        };
        annotations.push(Object::Reference(annotation_id));
        page.set("Annots", Object::Array(annotations));
    }

    let mut buffer = Vec::new();
    document
        .save_to(&mut buffer)
        .map_err(|err| ReportError::Annotation(err.to_string()))?;
    Ok(buffer)
}

fn annotation_dictionary(link: &UriLink) -> Dictionary {
    let mut action = Dictionary::new();
    action.set("Type", Object::Name(b"Action".to_vec()));
    action.set("S", Object::Name(b"URI".to_vec()));
    action.set("URI", Object::string_literal(link.uri.as_str()));

    let mut annotation = Dictionary::new();
    annotation.set("Type", Object::Name(b"Annot".to_vec()));
    annotation.set("Subtype", Object::Name(b"Link".to_vec()));
    annotation.set(
        "Rect",
        Object::Array(
            link.rect
                .iter()
                .map(|value| Object::Integer(value.round() as i64))
                .collect(),
        ),
    );
    annotation.set(
        "Border",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(0),
        ]),
    );
    annotation.set("A", Object::Dictionary(action));
    annotation
}
