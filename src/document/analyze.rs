//! Structural analysis
//!
//! Read-only views over a package: paragraph count, page break locations,
//! tables, images and headings, plus an alternate grouping of paragraphs
//! into sections. Neither view influences how documents are split.

use super::error::Result;
use super::io::{DocumentPackage, DOCUMENT_RELATIONSHIPS_PART};
use super::models::*;
use super::parsing::body::{BlockKind, DocumentBody};
use super::parsing::heading::heading_level_from_style;
use super::parsing::paragraph::inspect_paragraph;
use super::parsing::relationships::count_image_relationships;

/// Analyze the structure of a .docx held in memory.
///
/// Page breaks are listed in paragraph order; for a paragraph carrying both
/// markers the `before` entry comes first. A document without paragraphs is
/// not an error.
pub fn analyze_docx(bytes: &[u8]) -> Result<DocumentStructure> {
    let mut package = DocumentPackage::open(bytes)?;
    let xml = package.document_part()?;
    let body = DocumentBody::parse(&xml)?;

    let mut structure = DocumentStructure {
        total_paragraphs: body.paragraph_count(),
        tables: body.count(BlockKind::Table),
        ..Default::default()
    };

    for (paragraph_index, paragraph) in body.paragraphs().enumerate() {
        let markers = inspect_paragraph(paragraph)?;

        if markers.page_break_before {
            structure.page_breaks.push(PageBreak {
                paragraph_index,
                kind: PageBreakKind::Before,
            });
        }
        if markers.explicit_page_break {
            structure.page_breaks.push(PageBreak {
                paragraph_index,
                kind: PageBreakKind::Explicit,
            });
        }
        if let Some(level) = markers.style_id.as_deref().and_then(heading_level_from_style) {
            structure.headings.record(level);
        }
    }

    if let Some(relationships) = package.read_part(DOCUMENT_RELATIONSHIPS_PART)? {
        structure.images = count_image_relationships(&relationships)?;
    }

    Ok(structure)
}

/// Group paragraphs into sections.
///
/// A paragraph whose properties hold `w:sectPr` closes the current section.
/// Paragraphs after the last marker form a final section, and a document
/// without markers is a single section.
pub fn analyze_sections(bytes: &[u8]) -> Result<SectionReport> {
    let mut package = DocumentPackage::open(bytes)?;
    let xml = package.document_part()?;
    let body = DocumentBody::parse(&xml)?;

    let mut sections = Vec::new();
    let mut paragraph_count = 0;

    for paragraph in body.paragraphs() {
        paragraph_count += 1;
        if inspect_paragraph(paragraph)?.section_break {
            sections.push(SectionInfo {
                section_number: sections.len() + 1,
                paragraph_count,
            });
            paragraph_count = 0;
        }
    }

    if paragraph_count > 0 || sections.is_empty() {
        sections.push(SectionInfo {
            section_number: sections.len() + 1,
            paragraph_count,
        });
    }

    Ok(SectionReport {
        total_paragraphs: body.paragraph_count(),
        sections,
    })
}
