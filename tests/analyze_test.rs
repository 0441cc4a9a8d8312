mod common;

use common::*;
use docx_chunker::document::{
    analyze_docx, analyze_sections, DocxError, PageBreak, PageBreakKind, SectionInfo,
};

fn page_break(paragraph_index: usize, kind: PageBreakKind) -> PageBreak {
    PageBreak {
        paragraph_index,
        kind,
    }
}

#[cfg(test)]
mod structure_tests {
    use super::*;

    #[test]
    fn test_page_breaks_are_reported_by_paragraph() {
        let body = format!(
            "{}{}{}{}",
            paragraph("plain"),
            r#"<w:p><w:r><w:t>end of page</w:t></w:r><w:r><w:br w:type="page"/></w:r></w:p>"#,
            r#"<w:p><w:pPr><w:pageBreakBefore/></w:pPr><w:r><w:t>new page</w:t></w:r></w:p>"#,
            r#"<w:p><w:pPr><w:pageBreakBefore/></w:pPr><w:r><w:br w:type="page"/></w:r></w:p>"#,
        );
        let structure = analyze_docx(&package_with_body(&body)).unwrap();

        assert_eq!(structure.total_paragraphs, 4);
        assert_eq!(
            structure.page_breaks,
            vec![
                page_break(1, PageBreakKind::Explicit),
                page_break(2, PageBreakKind::Before),
                page_break(3, PageBreakKind::Before),
                page_break(3, PageBreakKind::Explicit),
            ]
        );
    }

    #[test]
    fn test_headings_tables_and_images() {
        let body = format!(
            "{}{}{}{}<w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>{}",
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr></w:p>"#,
            r#"<w:p><w:pPr><w:pStyle w:val="Ttulo2"/></w:pPr></w:p>"#,
            r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr></w:p>"#,
            r#"<w:p><w:pPr><w:pStyle w:val="Heading4"/></w:pPr></w:p>"#,
            r#"<w:p><w:pPr><w:pStyle w:val="Ttulo3"/></w:pPr></w:p>"#,
        );
        let structure = analyze_docx(&package_with_body(&body)).unwrap();

        assert_eq!(structure.total_paragraphs, 5);
        assert_eq!(structure.tables, 1);
        assert_eq!(structure.images, 1);
        assert_eq!(structure.headings.h1, 1);
        assert_eq!(structure.headings.h2, 2);
        assert_eq!(structure.headings.h3, 1);
        assert_eq!(structure.headings.total(), 4);
    }

    #[test]
    fn test_empty_body_has_no_paragraphs() {
        let structure = analyze_docx(&package_with_body("")).unwrap();
        assert_eq!(structure.total_paragraphs, 0);
        assert!(structure.page_breaks.is_empty());
    }

    #[test]
    fn test_generated_document() {
        let structure = analyze_docx(&generated_docx(50)).unwrap();
        assert_eq!(structure.total_paragraphs, 50);
        assert_eq!(structure.headings.h1, 5);
        assert_eq!(
            structure.page_breaks,
            vec![
                page_break(24, PageBreakKind::Explicit),
                page_break(49, PageBreakKind::Explicit),
            ]
        );
    }

    #[test]
    fn test_non_zip_is_malformed() {
        assert!(matches!(
            analyze_docx(b"%PDF-1.7"),
            Err(DocxError::MalformedPackage(_))
        ));
    }

    #[test]
    fn test_missing_body_is_malformed() {
        let docx = package_with_document(r#"<w:document xmlns:w="urn:w"></w:document>"#);
        assert!(matches!(
            analyze_docx(&docx),
            Err(DocxError::MalformedPackage(_))
        ));
    }

    #[test]
    fn test_page_breaks_serialize_with_type_names() {
        let json = serde_json::to_value(page_break(7, PageBreakKind::Before)).unwrap();
        assert_eq!(json, serde_json::json!({ "paragraphIndex": 7, "type": "before" }));
    }
}

#[cfg(test)]
mod section_tests {
    use super::*;

    const SECTION_BREAK: &str =
        r#"<w:p><w:pPr><w:sectPr><w:type w:val="nextPage"/></w:sectPr></w:pPr></w:p>"#;

    fn section(section_number: usize, paragraph_count: usize) -> SectionInfo {
        SectionInfo {
            section_number,
            paragraph_count,
        }
    }

    #[test]
    fn test_no_markers_is_one_section() {
        let report = analyze_sections(&package_with_body(&numbered_paragraphs(7))).unwrap();
        assert_eq!(report.total_paragraphs, 7);
        assert_eq!(report.sections, vec![section(1, 7)]);
    }

    #[test]
    fn test_markers_close_sections() {
        let body = format!(
            "{}{SECTION_BREAK}{}{SECTION_BREAK}{}",
            numbered_paragraphs(2),
            numbered_paragraphs(3),
            numbered_paragraphs(4)
        );
        let report = analyze_sections(&package_with_body(&body)).unwrap();

        assert_eq!(report.total_paragraphs, 11);
        assert_eq!(report.sections, vec![section(1, 3), section(2, 4), section(3, 4)]);
    }

    #[test]
    fn test_marker_on_last_paragraph() {
        let body = format!("{}{SECTION_BREAK}", numbered_paragraphs(2));
        let report = analyze_sections(&package_with_body(&body)).unwrap();
        assert_eq!(report.sections, vec![section(1, 3)]);
    }

    #[test]
    fn test_every_paragraph_belongs_to_one_section() {
        let body = format!("{SECTION_BREAK}{SECTION_BREAK}{}", numbered_paragraphs(5));
        let report = analyze_sections(&package_with_body(&body)).unwrap();

        let counted: usize = report.sections.iter().map(|s| s.paragraph_count).sum();
        assert_eq!(counted, report.total_paragraphs);
    }

    #[test]
    fn test_empty_document_is_one_empty_section() {
        let report = analyze_sections(&package_with_body("")).unwrap();
        assert_eq!(report.sections, vec![section(1, 0)]);
    }
}
