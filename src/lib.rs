//! docx-chunker: split .docx files into chunks and merge them back
//!
//! This library splits Microsoft Word documents into self-contained chunk
//! archives of a fixed number of paragraphs, stores them with their
//! metadata, and reassembles them into a single document on demand.

pub mod config;
pub mod document;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use document::{
    analyze_docx, analyze_sections, merge_chunks, split_docx, DocumentMetadata, DocxError,
    SplitOptions,
};
pub use service::{DocumentService, ServiceError, StatusKind};
pub use storage::DocumentStore;
