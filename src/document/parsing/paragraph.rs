//! Paragraph marker inspection
//!
//! Paragraphs stay opaque to splitting and merging. Structural analysis only
//! needs a handful of markers, read here from the paragraph's own properties
//! and runs. Paragraphs nested inside text boxes are not looked at.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::super::error::{DocxError, Result};

const PARAGRAPH_TAG: &[u8] = b"w:p";
const PARAGRAPH_PROPERTIES_TAG: &[u8] = b"w:pPr";
const RUN_TAG: &[u8] = b"w:r";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ParagraphMarkers {
    /// `<w:pageBreakBefore/>` in the paragraph properties
    pub(crate) page_break_before: bool,
    /// A run holds `<w:br w:type="page"/>`
    pub(crate) explicit_page_break: bool,
    /// Value of `<w:pStyle w:val="..."/>`
    pub(crate) style_id: Option<String>,
    /// `<w:sectPr>` in the paragraph properties ends a section
    pub(crate) section_break: bool,
}

pub(crate) fn inspect_paragraph(xml: &[u8]) -> Result<ParagraphMarkers> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut markers = ParagraphMarkers::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                inspect_element(e, &path, &mut markers);
                path.push(e.name().as_ref().to_vec());
            }
            Ok(Event::Empty(ref e)) => inspect_element(e, &path, &mut markers),
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocxError::malformed(format!(
                    "paragraph is not well formed: {e}"
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(markers)
}

fn inspect_element(element: &BytesStart, path: &[Vec<u8>], markers: &mut ParagraphMarkers) {
    let parent = match path {
        [paragraph, parent] if paragraph.as_slice() == PARAGRAPH_TAG => parent.as_slice(),
        _ => return,
    };

    match (parent, element.name().as_ref()) {
        (PARAGRAPH_PROPERTIES_TAG, b"w:pageBreakBefore") => {
            markers.page_break_before = is_on(element);
        }
        (PARAGRAPH_PROPERTIES_TAG, b"w:pStyle") => {
            markers.style_id = attribute(element, b"w:val");
        }
        (PARAGRAPH_PROPERTIES_TAG, b"w:sectPr") => {
            markers.section_break = true;
        }
        (RUN_TAG, b"w:br") if attribute(element, b"w:type").as_deref() == Some("page") => {
            markers.explicit_page_break = true;
        }
        _ => {}
    }
}

fn attribute(element: &BytesStart, name: &[u8]) -> Option<String> {
    element
        .try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|attr| attr.unescape_value().ok().map(|value| value.into_owned()))
}

/// OOXML on/off properties are on unless `w:val` says otherwise
fn is_on(element: &BytesStart) -> bool {
    !matches!(
        attribute(element, b"w:val").as_deref(),
        Some("false" | "0" | "off")
    )
}
