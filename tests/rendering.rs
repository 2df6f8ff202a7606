use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use image::{Rgba, RgbaImage};
use person_report::config::LOGO_IMAGE;
use person_report::fonts;
use person_report::{Person, ReportBuilder, ReportConfig};
use sha2::{Digest, Sha256};

const SKIP_MESSAGE: &str =
    "bundled fonts missing. Set PERSON_REPORT_FONTS_DIR or copy assets/fonts next to the binary.";

fn timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 9)
        .and_then(|date| date.and_hms_opt(14, 5, 0))
        .expect("valid timestamp")
}

fn sample_people(count: u32) -> Vec<Person> {
    (1..=count)
        .map(|id| {
            let person = Person::new(id, "Maria", format!("Souza {}", id))
                .with_salary(2500.0 + f64::from(id) * 10.5)
                .with_employed(id % 3 != 0);
            if id % 4 == 0 {
                person
            } else {
                person.with_profession("Engineer")
            }
        })
        .collect()
}

fn write_logo(assets_dir: &Path) {
    let path = assets_dir.join(LOGO_IMAGE);
    std::fs::create_dir_all(path.parent().expect("logo dir")).expect("create img dir");
    RgbaImage::from_pixel(64, 32, Rgba([200, 0, 0, 255]))
        .save(&path)
        .expect("write logo");
}

fn builder(assets_dir: &Path, output_dir: &Path) -> ReportBuilder {
    let config = ReportConfig::default()
        .with_assets_dir(assets_dir)
        .with_output_dir(output_dir)
        .with_open_viewer(false);
    ReportBuilder::new(config).with_generated_at(timestamp())
}

fn render_sample_pdf(count: u32) -> Option<Vec<u8>> {
    if !fonts::default_fonts_available() {
        return None;
    }

    let assets = tempfile::tempdir().expect("create assets dir");
    write_logo(assets.path());
    let report = builder(assets.path(), assets.path())
        .render(&sample_people(count))
        .expect("render sample pdf")
        .expect("non-empty selection");
    Some(report.bytes)
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() {
                    let byte = data[cursor];
                    if byte == terminator {
                        break;
                    }
                    if terminator == b')' {
                        data[cursor] = b'0';
                    } else if !matches!(byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    fn scrub_xml(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while offset + start.len() < data.len() {
            if let Some(start_pos) = data[offset..]
                .windows(start.len())
                .position(|window| window == start)
            {
                let start_index = offset + start_pos + start.len();
                if let Some(end_pos) = data[start_index..]
                    .windows(end.len())
                    .position(|window| window == end)
                {
                    for byte in &mut data[start_index..start_index + end_pos] {
                        if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                            *byte = b'0';
                        }
                    }
                    offset = start_index + end_pos + end.len();
                } else {
                    break;
                }
            } else {
                break;
            }
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_segment(&mut normalized, b"/CreationDate(", b')');
    scrub_segment(&mut normalized, b"/ModDate(", b')');
    scrub_segment(&mut normalized, b"/ID[", b']');
    scrub_segment(&mut normalized, b"/Producer(", b')');
    scrub_xml(&mut normalized, b"<xmp:CreateDate>", b"</xmp:CreateDate>");
    scrub_xml(&mut normalized, b"<xmp:ModifyDate>", b"</xmp:ModifyDate>");
    scrub_xml(
        &mut normalized,
        b"<xmp:MetadataDate>",
        b"</xmp:MetadataDate>",
    );
    scrub_xml(
        &mut normalized,
        b"<xmpMM:DocumentID>",
        b"</xmpMM:DocumentID>",
    );
    scrub_xml(
        &mut normalized,
        b"<xmpMM:InstanceID>",
        b"</xmpMM:InstanceID>",
    );
    scrub_xml(&mut normalized, b"<xmpMM:VersionID>", b"</xmpMM:VersionID>");
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    let normalized = scrub_pdf(bytes);
    let digest = Sha256::digest(&normalized);
    digest.into()
}

#[test]
fn renders_non_empty_output() {
    let Some(bytes) = render_sample_pdf(3) else {
        eprintln!("Skipping renders_non_empty_output: {}", SKIP_MESSAGE);
        return;
    };
    assert!(bytes.starts_with(b"%PDF"), "rendered report should be a PDF");
}

#[test]
fn rendering_is_deterministic() {
    let (Some(bytes_a), Some(bytes_b)) = (render_sample_pdf(40), render_sample_pdf(40)) else {
        eprintln!("Skipping rendering_is_deterministic: {}", SKIP_MESSAGE);
        return;
    };

    assert_eq!(bytes_a.len(), bytes_b.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&bytes_a),
        normalized_hash(&bytes_b),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn page_count_follows_the_row_capacity() {
    if !fonts::default_fonts_available() {
        eprintln!("Skipping page_count_follows_the_row_capacity: {}", SKIP_MESSAGE);
        return;
    }

    let assets = tempfile::tempdir().expect("create assets dir");
    write_logo(assets.path());
    for (rows, pages) in [(1, 1), (24, 1), (25, 2), (53, 2), (54, 3), (84, 4)] {
        let report = builder(assets.path(), assets.path())
            .render(&sample_people(rows))
            .expect("render report")
            .expect("non-empty selection");
        let document = lopdf::Document::load_mem(&report.bytes).expect("parse rendered pdf");

        assert_eq!(report.total_pages, pages, "announced pages for {} rows", rows);
        assert_eq!(report.pages_rendered, pages, "decorated pages for {} rows", rows);
        assert_eq!(document.get_pages().len(), pages, "pdf pages for {} rows", rows);
    }
}

fn image_draws_on_page(document: &lopdf::Document, page: u32) -> usize {
    let page_id = document.get_pages()[&page];
    let content = document.get_page_content(page_id).expect("page content");
    lopdf::content::Content::decode(&content)
        .expect("decode page content")
        .operations
        .iter()
        .filter(|operation| operation.operator == "Do")
        .count()
}

#[test]
fn odd_rows_are_filled() {
    if !fonts::default_fonts_available() {
        eprintln!("Skipping odd_rows_are_filled: {}", SKIP_MESSAGE);
        return;
    }

    // No logo and no icons, so every image on the page is a row band.
    let assets = tempfile::tempdir().expect("create assets dir");
    let render = |rows| {
        let report = builder(assets.path(), assets.path())
            .render(&sample_people(rows))
            .expect("render report")
            .expect("non-empty selection");
        lopdf::Document::load_mem(&report.bytes).expect("parse rendered pdf")
    };

    // Header and person 2 stay white, person 1 and 3 are gray across five cells.
    assert_eq!(image_draws_on_page(&render(1), 1), 5);
    assert_eq!(image_draws_on_page(&render(2), 1), 5);
    assert_eq!(image_draws_on_page(&render(3), 1), 10);
}

#[cfg(feature = "hyperlink")]
fn first_page_link_uris(bytes: &[u8]) -> Vec<Vec<u8>> {
    let document = lopdf::Document::load_mem(bytes).expect("parse rendered pdf");
    let pages = document.get_pages();
    let page_id = pages.get(&1).copied().expect("first page");
    let page = document
        .get_object(page_id)
        .and_then(lopdf::Object::as_dict)
        .expect("page dictionary");
    let Ok(annotations) = page.get(b"Annots").and_then(lopdf::Object::as_array) else {
        return Vec::new();
    };

    annotations
        .iter()
        .map(|annotation| {
            let annotation = annotation
                .as_reference()
                .and_then(|id| document.get_dictionary(id))
                .expect("annotation dictionary");
            let action = annotation
                .get(b"A")
                .and_then(lopdf::Object::as_dict)
                .expect("link action");
            action
                .get(b"URI")
                .and_then(lopdf::Object::as_str)
                .expect("uri string")
                .to_vec()
        })
        .collect()
}

#[cfg(feature = "hyperlink")]
#[test]
fn first_page_carries_the_channel_link() {
    let Some(bytes) = render_sample_pdf(2) else {
        eprintln!("Skipping first_page_carries_the_channel_link: {}", SKIP_MESSAGE);
        return;
    };
    assert_eq!(
        first_page_link_uris(&bytes),
        vec![b"https://www.youtube.com/maroquio".to_vec()]
    );
}

#[cfg(feature = "hyperlink")]
#[test]
fn channel_link_does_not_need_the_logo() {
    if !fonts::default_fonts_available() {
        eprintln!("Skipping channel_link_does_not_need_the_logo: {}", SKIP_MESSAGE);
        return;
    }

    let assets = tempfile::tempdir().expect("create assets dir");
    let report = builder(assets.path(), assets.path())
        .render(&sample_people(2))
        .expect("render report")
        .expect("non-empty selection");
    assert_eq!(first_page_link_uris(&report.bytes).len(), 1);
}

#[test]
fn generate_writes_a_timestamped_file() {
    if !fonts::default_fonts_available() {
        eprintln!("Skipping generate_writes_a_timestamped_file: {}", SKIP_MESSAGE);
        return;
    }

    let assets = tempfile::tempdir().expect("create assets dir");
    let output = tempfile::tempdir().expect("create output dir");
    let path = builder(assets.path(), output.path())
        .generate(&sample_people(5))
        .expect("generate report")
        .expect("written file");

    assert_eq!(path, output.path().join("pessoas.2024.03.09.14.05.00.pdf"));
    assert!(std::fs::metadata(&path).expect("report metadata").len() > 0);
}

#[test]
fn empty_input_writes_nothing() {
    let assets = tempfile::tempdir().expect("create assets dir");
    let output = tempfile::tempdir().expect("create output dir");
    let written = builder(assets.path(), output.path())
        .generate(&[])
        .expect("generate report");

    assert!(written.is_none());
    assert_eq!(std::fs::read_dir(output.path()).expect("list output").count(), 0);
}
