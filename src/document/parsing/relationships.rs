//! Relationship part parsing
//!
//! Images are counted from `word/_rels/document.xml.rels` rather than from
//! the body, so an image referenced twice is counted once.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::super::error::{DocxError, Result};

/// Count relationships whose `Type` mentions "image"
pub(crate) fn count_image_relationships(xml: &[u8]) -> Result<usize> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut images = 0;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let is_image = e
                    .try_get_attribute("Type")
                    .ok()
                    .flatten()
                    .is_some_and(|attr| attr.value.windows(5).any(|w| w == b"image"));
                if is_image {
                    images += 1;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocxError::malformed(format!(
                    "relationships part is not well formed: {e}"
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(images)
}
