//! Document body scanning
//!
//! The body of `word/document.xml` is read as an ordered list of top-level
//! blocks. Each block is an opaque byte span of the source XML, so blocks can
//! be sliced from one document and spliced into another without changing a
//! single byte of their content.

use std::borrow::Cow;
use std::ops::Range;

use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;

use super::super::error::{DocxError, Result};

const DOCUMENT_TAG: &[u8] = b"w:document";
const BODY_TAG: &[u8] = b"w:body";
const PARAGRAPH_TAG: &[u8] = b"w:p";
const TABLE_TAG: &[u8] = b"w:tbl";
const SECTION_PROPERTIES_TAG: &[u8] = b"w:sectPr";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockKind {
    Paragraph,
    Table,
    SectionProperties,
    Other,
}

impl BlockKind {
    fn from_tag(tag: &[u8]) -> Self {
        match tag {
            PARAGRAPH_TAG => BlockKind::Paragraph,
            TABLE_TAG => BlockKind::Table,
            SECTION_PROPERTIES_TAG => BlockKind::SectionProperties,
            _ => BlockKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Block<'a> {
    pub(crate) kind: BlockKind,
    pub(crate) xml: &'a [u8],
}

/// The parsed body of a document part
#[derive(Debug, Clone)]
pub(crate) struct DocumentBody<'a> {
    /// Everything up to and including the `<w:body>` start tag
    head: Cow<'a, [u8]>,
    /// Everything from the `</w:body>` end tag onwards
    tail: Cow<'a, [u8]>,
    /// Body children in order, without the trailing section properties
    content: Vec<Block<'a>>,
    /// The body-level `w:sectPr`, when it is the last child of the body
    section_properties: Option<&'a [u8]>,
    /// Positions in `content` of every paragraph block
    paragraph_positions: Vec<usize>,
}

impl<'a> DocumentBody<'a> {
    /// Locate `w:document/w:body` and collect its children.
    ///
    /// Fails with `MalformedPackage` if the XML is not well formed, the root
    /// is not `w:document`, or the root has no `w:body`.
    pub(crate) fn parse(xml: &'a [u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut buf = Vec::new();
        let mut skip_buf = Vec::new();
        let mut in_root = false;

        loop {
            let start = reader.buffer_position() as usize;
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) if !in_root => {
                    if e.name().as_ref() != DOCUMENT_TAG {
                        return Err(DocxError::malformed("root element is not w:document"));
                    }
                    in_root = true;
                }
                Ok(Event::Start(ref e)) if e.name().as_ref() == BODY_TAG => {
                    let head_end = reader.buffer_position() as usize;
                    return Self::parse_children(xml, reader, Cow::Borrowed(&xml[..head_end]));
                }
                Ok(Event::Start(ref e)) => {
                    // Root-level siblings of the body such as w:background
                    let name = e.name().as_ref().to_vec();
                    reader
                        .read_to_end_into(QName(&name), &mut skip_buf)
                        .map_err(|e| xml_error(&e))?;
                    skip_buf.clear();
                }
                Ok(Event::Empty(ref e)) if in_root && e.name().as_ref() == BODY_TAG => {
                    let end = reader.buffer_position() as usize;
                    return Ok(Self::from_empty_body(xml, start..end));
                }
                Ok(Event::Empty(_)) if !in_root => {
                    return Err(DocxError::malformed("document element has no body"));
                }
                Ok(Event::End(_)) | Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error(&e)),
                _ => {}
            }
            buf.clear();
        }

        Err(DocxError::malformed("document body not found"))
    }

    fn parse_children(
        xml: &'a [u8],
        mut reader: Reader<&'a [u8]>,
        head: Cow<'a, [u8]>,
    ) -> Result<Self> {
        let mut buf = Vec::new();
        let mut skip_buf = Vec::new();
        let mut content = Vec::new();

        let tail_start = loop {
            let start = reader.buffer_position() as usize;
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let name = e.name().as_ref().to_vec();
                    reader
                        .read_to_end_into(QName(&name), &mut skip_buf)
                        .map_err(|e| xml_error(&e))?;
                    skip_buf.clear();
                    let end = reader.buffer_position() as usize;
                    content.push(Block {
                        kind: BlockKind::from_tag(&name),
                        xml: &xml[start..end],
                    });
                }
                Ok(Event::Empty(ref e)) => {
                    let end = reader.buffer_position() as usize;
                    content.push(Block {
                        kind: BlockKind::from_tag(e.name().as_ref()),
                        xml: &xml[start..end],
                    });
                }
                Ok(Event::End(_)) => break start,
                Ok(Event::Eof) => return Err(DocxError::malformed("unterminated document body")),
                Err(e) => return Err(xml_error(&e)),
                // Whitespace, comments and processing instructions between blocks
                _ => {}
            }
            buf.clear();
        };

        let section_properties = match content.last() {
            Some(block) if block.kind == BlockKind::SectionProperties => {
                content.pop().map(|block| block.xml)
            }
            _ => None,
        };

        Ok(Self::assemble(
            head,
            Cow::Borrowed(&xml[tail_start..]),
            content,
            section_properties,
        ))
    }

    fn from_empty_body(xml: &'a [u8], tag: Range<usize>) -> Self {
        // `<w:body/>` is opened up into `<w:body>` ... `</w:body>`
        let open_tag = &xml[tag.start..tag.end - 2];
        let mut head = xml[..tag.start].to_vec();
        head.extend_from_slice(open_tag.trim_ascii_end());
        head.push(b'>');

        let mut tail = b"</w:body>".to_vec();
        tail.extend_from_slice(&xml[tag.end..]);

        Self::assemble(Cow::Owned(head), Cow::Owned(tail), Vec::new(), None)
    }

    fn assemble(
        head: Cow<'a, [u8]>,
        tail: Cow<'a, [u8]>,
        content: Vec<Block<'a>>,
        section_properties: Option<&'a [u8]>,
    ) -> Self {
        let paragraph_positions = content
            .iter()
            .enumerate()
            .filter(|(_, block)| block.kind == BlockKind::Paragraph)
            .map(|(position, _)| position)
            .collect();

        Self {
            head,
            tail,
            content,
            section_properties,
            paragraph_positions,
        }
    }

    pub(crate) fn paragraph_count(&self) -> usize {
        self.paragraph_positions.len()
    }

    /// True when the body has any child apart from its section properties
    pub(crate) fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    pub(crate) fn count(&self, kind: BlockKind) -> usize {
        self.content.iter().filter(|block| block.kind == kind).count()
    }

    /// Paragraph elements in document order
    pub(crate) fn paragraphs(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.paragraph_positions
            .iter()
            .map(|&position| self.content[position].xml)
    }

    /// All body children except the trailing section properties
    pub(crate) fn blocks(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.content.iter().map(|block| block.xml)
    }

    /// Blocks covering the paragraph range `paragraphs`.
    ///
    /// Non-paragraph blocks travel with the next paragraph; blocks after the
    /// last paragraph belong to the range that ends at the last paragraph.
    /// Adjacent ranges therefore cover every block exactly once.
    pub(crate) fn blocks_for(&self, paragraphs: Range<usize>) -> &[Block<'a>] {
        let total = self.paragraph_count();
        let start = match paragraphs.start {
            0 => 0,
            index => self.paragraph_positions[index - 1] + 1,
        };
        let end = match paragraphs.end {
            end if end >= total => self.content.len(),
            0 => 0,
            end => self.paragraph_positions[end - 1] + 1,
        };

        &self.content[start..end.max(start)]
    }

    /// Serialize a document part whose body holds `blocks` followed by this
    /// body's section properties. Everything outside the body is unchanged.
    pub(crate) fn render<'b>(&self, blocks: impl IntoIterator<Item = &'b [u8]>) -> Vec<u8> {
        let mut xml = self.head.to_vec();
        for block in blocks {
            xml.extend_from_slice(block);
        }
        if let Some(section_properties) = self.section_properties {
            xml.extend_from_slice(section_properties);
        }
        xml.extend_from_slice(&self.tail);
        xml
    }
}

fn xml_error(error: &quick_xml::Error) -> DocxError {
    DocxError::malformed(format!("document.xml is not well formed: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEAD: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;
    const SECT: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr>"#;
    const TAIL: &str = "</w:body></w:document>";

    fn paragraph(text: &str) -> String {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }

    fn document(body: &str) -> String {
        format!("{HEAD}{body}{SECT}{TAIL}")
    }

    #[test]
    fn test_paragraphs_are_read_in_order() {
        let xml = document(&format!("{}{}{}", paragraph("a"), paragraph("b"), paragraph("c")));
        let body = DocumentBody::parse(xml.as_bytes()).unwrap();

        let paragraphs: Vec<&[u8]> = body.paragraphs().collect();
        assert_eq!(paragraphs.len(), 3);
        assert_eq!(paragraphs[1], paragraph("b").as_bytes());
    }

    #[test]
    fn test_render_all_blocks_reproduces_document() {
        let xml = document(&format!(
            "{}<w:tbl><w:tr/></w:tbl>\n<w:p/>{}",
            paragraph("first"),
            paragraph("last")
        ));
        let body = DocumentBody::parse(xml.as_bytes()).unwrap();

        assert_eq!(body.paragraph_count(), 3);
        assert_eq!(body.count(BlockKind::Table), 1);
        // The newline between blocks is the only thing not carried over
        assert_eq!(body.render(body.blocks()), xml.replace('\n', "").into_bytes());
    }

    #[test]
    fn test_blocks_for_attaches_tables_to_next_paragraph() {
        let xml = document(&format!(
            "{}<w:tbl/>{}{}<w:bookmarkEnd w:id=\"0\"/>",
            paragraph("0"),
            paragraph("1"),
            paragraph("2")
        ));
        let body = DocumentBody::parse(xml.as_bytes()).unwrap();

        let first = body.blocks_for(0..1);
        assert_eq!(first.len(), 1);

        let second = body.blocks_for(1..2);
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].kind, BlockKind::Table);

        let third = body.blocks_for(2..3);
        assert_eq!(third.len(), 2);
        assert_eq!(third[1].kind, BlockKind::Other);
    }

    #[test]
    fn test_section_properties_kept_in_every_render() {
        let xml = document(&paragraph("x"));
        let body = DocumentBody::parse(xml.as_bytes()).unwrap();

        let rendered = String::from_utf8(body.render(std::iter::empty())).unwrap();
        assert_eq!(rendered, format!("{HEAD}{SECT}{TAIL}"));
    }

    #[test]
    fn test_empty_body_element_is_opened_up() {
        let xml = r#"<w:document xmlns:w="urn:w"><w:body/></w:document>"#;
        let body = DocumentBody::parse(xml.as_bytes()).unwrap();

        assert_eq!(body.paragraph_count(), 0);
        assert!(!body.has_content());
        let rendered = String::from_utf8(body.render([paragraph("new").as_bytes()])).unwrap();
        assert_eq!(
            rendered,
            format!(r#"<w:document xmlns:w="urn:w"><w:body>{}</w:body></w:document>"#, paragraph("new"))
        );
    }

    #[test]
    fn test_self_closing_paragraphs_count() {
        let xml = document("<w:p/><w:p/>");
        let body = DocumentBody::parse(xml.as_bytes()).unwrap();
        assert_eq!(body.paragraph_count(), 2);
    }

    #[test]
    fn test_missing_body_is_malformed() {
        let xml = r#"<w:document xmlns:w="urn:w"><w:background/></w:document>"#;
        assert!(matches!(
            DocumentBody::parse(xml.as_bytes()),
            Err(DocxError::MalformedPackage(_))
        ));
    }

    #[test]
    fn test_wrong_root_is_malformed() {
        let xml = r#"<w:styles xmlns:w="urn:w"><w:body/></w:styles>"#;
        assert!(matches!(
            DocumentBody::parse(xml.as_bytes()),
            Err(DocxError::MalformedPackage(_))
        ));
    }

    #[test]
    fn test_truncated_xml_is_malformed() {
        let xml = format!("{HEAD}<w:p><w:r>");
        assert!(matches!(
            DocumentBody::parse(xml.as_bytes()),
            Err(DocxError::MalformedPackage(_))
        ));
    }
}
