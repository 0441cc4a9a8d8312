//! Package I/O and validation
//!
//! This module opens .docx archives held in memory, reads individual parts,
//! and writes rebuilt archives in which only the document part changes.

use std::io::{Cursor, Read, Write};

use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::error::{DocxError, Result};

/// The main document part holding the paragraph sequence
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Relationships of the main document part (images, hyperlinks, headers...)
pub const DOCUMENT_RELATIONSHIPS_PART: &str = "word/_rels/document.xml.rels";

/// An opened .docx archive borrowing its bytes
pub struct DocumentPackage<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> DocumentPackage<'a> {
    /// Open and validate a .docx archive.
    ///
    /// Fails with `MalformedPackage` when the bytes are not a ZIP archive or
    /// when `word/document.xml` is missing.
    pub fn open(bytes: &'a [u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DocxError::malformed(format!("not a ZIP archive ({e})")))?;

        if archive.by_name(DOCUMENT_PART).is_err() {
            // Check if it might be an Excel file
            if archive.by_name("xl/workbook.xml").is_ok() {
                return Err(DocxError::malformed(
                    "this appears to be an Excel file (.xlsx), not a Word document",
                ));
            }

            return Err(DocxError::malformed(format!("missing {DOCUMENT_PART}")));
        }

        Ok(Self { archive })
    }

    /// Number of entries in the archive, directories included
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.len() == 0
    }

    /// Names of all file parts in archive order
    pub fn part_names(&self) -> Vec<String> {
        (0..self.archive.len())
            .filter_map(|index| self.archive.name_for_index(index))
            .filter(|name| !name.ends_with('/'))
            .map(str::to_string)
            .collect()
    }

    /// Read one part, or `None` when the archive doesn't contain it
    pub fn read_part(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(DocxError::malformed(format!("cannot open {name}: {e}"))),
        };

        let mut content = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut content)
            .map_err(|e| DocxError::malformed(format!("cannot read {name}: {e}")))?;
        Ok(Some(content))
    }

    /// Read `word/document.xml`
    pub fn document_part(&mut self) -> Result<Vec<u8>> {
        self.read_part(DOCUMENT_PART)?
            .ok_or_else(|| DocxError::malformed(format!("missing {DOCUMENT_PART}")))
    }

    /// Write a new archive where the document part is replaced by
    /// `document_xml` and every other part is carried over unchanged.
    ///
    /// Unchanged parts are copied in their compressed form, so their bytes
    /// and compression method are identical to the source archive. The new
    /// document part is deflated and keeps its original position.
    pub fn rebuild(&mut self, document_xml: &[u8]) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for index in 0..self.archive.len() {
            let file = self.archive.by_index_raw(index)?;
            if file.is_dir() {
                continue;
            }

            if file.name() == DOCUMENT_PART {
                drop(file);
                writer.start_file(DOCUMENT_PART, options)?;
                writer.write_all(document_xml)?;
            } else {
                writer.raw_copy_file(file)?;
            }
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}
