//! Splitting a document into chunk archives
//!
//! Every chunk is a complete .docx: the original package with the body of
//! its document part cut down to a contiguous paragraph range.

use chrono::Utc;

use super::error::{DocxError, Result};
use super::io::DocumentPackage;
use super::models::*;
use super::parsing::body::DocumentBody;

const TRACING_TARGET: &str = "docx_chunker::split";

/// Split a .docx into chunks of `options.paragraphs_per_chunk` paragraphs.
///
/// A document whose body is empty still yields one chunk without
/// paragraphs, so every upload has something to view and merge. A body that
/// has content but no paragraph at all fails with `NoParagraphsFound`.
pub fn split_docx(
    bytes: &[u8],
    document_id: &str,
    original_name: &str,
    options: SplitOptions,
) -> Result<SplitResult> {
    let paragraphs_per_chunk = options.paragraphs_per_chunk.max(1);

    let mut package = DocumentPackage::open(bytes)?;
    let xml = package.document_part()?;
    let body = DocumentBody::parse(&xml)?;

    let total_paragraphs = body.paragraph_count();
    if total_paragraphs == 0 && body.has_content() {
        return Err(DocxError::NoParagraphsFound);
    }

    let total_chunks = total_paragraphs.div_ceil(paragraphs_per_chunk).max(1);
    let mut chunks = Vec::with_capacity(total_chunks);
    let mut descriptors = Vec::with_capacity(total_chunks);

    for chunk_index in 0..total_chunks {
        let start = chunk_index * paragraphs_per_chunk;
        let end = (start + paragraphs_per_chunk).min(total_paragraphs);

        let blocks = body.blocks_for(start..end);
        let chunk_xml = body.render(blocks.iter().map(|block| block.xml));
        let chunk = package.rebuild(&chunk_xml)?;

        tracing::debug!(
            target: TRACING_TARGET,
            document_id,
            chunk_index,
            start,
            end,
            bytes = chunk.len(),
            "Built chunk"
        );

        chunks.push(chunk);
        descriptors.push(ChunkDescriptor {
            id: format!("{document_id}-chunk-{chunk_index}"),
            chunk_index,
            start_paragraph: start,
            end_paragraph: end,
            total_paragraphs: end - start,
        });
    }

    tracing::info!(
        target: TRACING_TARGET,
        document_id,
        total_paragraphs,
        total_chunks,
        "Split document"
    );

    Ok(SplitResult {
        metadata: DocumentMetadata {
            document_id: document_id.to_string(),
            original_name: original_name.to_string(),
            total_paragraphs,
            total_chunks,
            paragraphs_per_chunk,
            chunks: descriptors,
            uploaded_at: Utc::now(),
        },
        chunks,
    })
}
