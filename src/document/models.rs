//! Core data structures for split and merge results
//!
//! This module defines the public types produced by structural analysis,
//! splitting and merging. Metadata types serialize with camelCase keys so
//! stored `metadata.json` files keep their established shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of paragraphs per chunk (roughly three rendered pages)
pub const PARAGRAPHS_PER_CHUNK: usize = 50;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PageBreakKind {
    /// `<w:br w:type="page"/>` inside a run
    Explicit,
    /// `<w:pageBreakBefore/>` in the paragraph properties
    Before,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageBreak {
    pub paragraph_index: usize,
    #[serde(rename = "type")]
    pub kind: PageBreakKind,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HeadingCounts {
    pub h1: usize,
    pub h2: usize,
    pub h3: usize,
}

impl HeadingCounts {
    pub fn total(&self) -> usize {
        self.h1 + self.h2 + self.h3
    }

    pub(crate) fn record(&mut self, level: u8) {
        match level {
            1 => self.h1 += 1,
            2 => self.h2 += 1,
            3 => self.h3 += 1,
            _ => {}
        }
    }
}

/// Result of the structural analysis of a document part
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStructure {
    pub total_paragraphs: usize,
    pub page_breaks: Vec<PageBreak>,
    pub tables: usize,
    pub images: usize,
    pub headings: HeadingCounts,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SectionInfo {
    pub section_number: usize,
    pub paragraph_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SectionReport {
    pub total_paragraphs: usize,
    pub sections: Vec<SectionInfo>,
}

/// Position of one chunk inside the original paragraph sequence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChunkDescriptor {
    pub id: String,
    pub chunk_index: usize,
    pub start_paragraph: usize,
    pub end_paragraph: usize,
    pub total_paragraphs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub document_id: String,
    pub original_name: String,
    pub total_paragraphs: usize,
    pub total_chunks: usize,
    pub paragraphs_per_chunk: usize,
    pub chunks: Vec<ChunkDescriptor>,
    pub uploaded_at: DateTime<Utc>,
}

/// Chunk archives, index-aligned with `metadata.chunks`
#[derive(Debug, Clone)]
pub struct SplitResult {
    pub metadata: DocumentMetadata,
    pub chunks: Vec<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub document: Vec<u8>,
    /// Input positions whose document part could not be read
    pub skipped_chunks: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitOptions {
    pub paragraphs_per_chunk: usize,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            paragraphs_per_chunk: PARAGRAPHS_PER_CHUNK,
        }
    }
}
