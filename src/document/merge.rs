//! Merging chunk archives back into one document
//!
//! The first chunk is the base: its package supplies every part except the
//! document body, which becomes the concatenation of all chunk bodies.

use super::error::{DocxError, Result};
use super::io::DocumentPackage;
use super::models::MergeOutcome;
use super::parsing::body::DocumentBody;

const TRACING_TARGET: &str = "docx_chunker::merge";

/// Merge chunks, given in chunk-index order, into one .docx.
///
/// A single chunk is returned unchanged. A later chunk whose document part
/// can't be read is skipped with a warning and reported in
/// `MergeOutcome::skipped_chunks`; only an unreadable first chunk is fatal.
pub fn merge_chunks<B: AsRef<[u8]>>(chunks: &[B]) -> Result<MergeOutcome> {
    let (base, rest) = chunks.split_first().ok_or(DocxError::EmptyInput)?;

    if rest.is_empty() {
        return Ok(MergeOutcome {
            document: base.as_ref().to_vec(),
            skipped_chunks: Vec::new(),
        });
    }

    let mut base_package = DocumentPackage::open(base.as_ref()).map_err(invalid_base)?;
    let base_xml = base_package.document_part().map_err(invalid_base)?;
    let base_body = DocumentBody::parse(&base_xml).map_err(invalid_base)?;

    let documents: Vec<Result<Vec<u8>>> = rest
        .iter()
        .map(|chunk| DocumentPackage::open(chunk.as_ref())?.document_part())
        .collect();

    let mut blocks: Vec<&[u8]> = base_body.blocks().collect();
    let mut skipped_chunks = Vec::new();

    for (offset, document) in documents.iter().enumerate() {
        let chunk_index = offset + 1;
        let parsed = match document {
            Ok(xml) => DocumentBody::parse(xml),
            Err(error) => {
                skip_chunk(chunk_index, error, &mut skipped_chunks);
                continue;
            }
        };

        match parsed {
            Ok(body) => blocks.extend(body.blocks()),
            Err(error) => skip_chunk(chunk_index, &error, &mut skipped_chunks),
        }
    }

    let merged_xml = base_body.render(blocks.iter().copied());
    let document = base_package.rebuild(&merged_xml)?;

    tracing::info!(
        target: TRACING_TARGET,
        chunks = chunks.len(),
        skipped = skipped_chunks.len(),
        bytes = document.len(),
        "Merged chunks"
    );

    Ok(MergeOutcome {
        document,
        skipped_chunks,
    })
}

fn invalid_base(error: DocxError) -> DocxError {
    DocxError::InvalidBaseChunk(error.to_string())
}

fn skip_chunk(chunk_index: usize, error: &DocxError, skipped_chunks: &mut Vec<usize>) {
    tracing::warn!(
        target: TRACING_TARGET,
        chunk_index,
        error = %error,
        "Skipping unreadable chunk, its paragraphs are missing from the merged document"
    );
    skipped_chunks.push(chunk_index);
}
