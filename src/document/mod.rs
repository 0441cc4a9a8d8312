//! Document splitting, merging and analysis
//!
//! This module provides the in-memory transformations over .docx packages:
//! structural analysis, splitting into paragraph-bounded chunk archives, and
//! merging chunks back into a single document.

pub mod analyze;
pub mod error;
pub mod io;
pub mod merge;
pub mod models;
pub(crate) mod parsing;
pub mod split;

pub use analyze::{analyze_docx, analyze_sections};
pub use error::DocxError;
pub use io::{DocumentPackage, DOCUMENT_PART};
pub use merge::merge_chunks;
pub use models::*;
pub use split::split_docx;
