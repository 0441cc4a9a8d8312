//! Typed failures raised by the document core
//!
//! Parsing, splitting and merging report one of these. Callers at the
//! service boundary decide how each maps to a user-facing status.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocxError {
    /// Not a ZIP archive, no `word/document.xml`, or the body can't be located
    #[error("Invalid .docx package: {0}")]
    MalformedPackage(String),

    /// The body holds content but not a single `w:p` element
    #[error("No paragraphs found in document body")]
    NoParagraphsFound,

    #[error("Invalid base chunk: {0}")]
    InvalidBaseChunk(String),

    #[error("No chunks to merge")]
    EmptyInput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, DocxError>;

impl DocxError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        DocxError::MalformedPackage(message.into())
    }
}
