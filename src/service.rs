//! Request-level operations over the document store
//!
//! Each operation takes the inputs an upload or download request would carry
//! and returns a serializable response or a `ServiceError` carrying the
//! status it maps to.

use serde::Serialize;
use thiserror::Error;

use crate::document::{self, DocumentMetadata, DocxError, PageBreak, SectionInfo, SplitOptions};
use crate::storage::{self, DocumentStore};

const TRACING_TARGET: &str = "docx_chunker::service";

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusKind {
    BadRequest,
    NotFound,
    Internal,
}

impl StatusKind {
    /// Matching HTTP status code
    pub fn code(self) -> u16 {
        match self {
            StatusKind::BadRequest => 400,
            StatusKind::NotFound => 404,
            StatusKind::Internal => 500,
        }
    }
}

#[derive(Debug, Error, Serialize)]
#[error("{message}")]
pub struct ServiceError {
    #[serde(skip)]
    pub kind: StatusKind,
    #[serde(rename = "error")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::BadRequest,
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::NotFound,
            message: message.into(),
            details: None,
        }
    }

    pub fn internal(message: impl Into<String>, details: impl ToString) -> Self {
        Self {
            kind: StatusKind::Internal,
            message: message.into(),
            details: Some(details.to_string()),
        }
    }

    /// Malformed uploads are the client's fault, anything else is ours
    fn from_docx(message: &str, error: DocxError) -> Self {
        match error {
            DocxError::MalformedPackage(_) | DocxError::NoParagraphsFound => Self {
                kind: StatusKind::BadRequest,
                message: message.to_string(),
                details: Some(error.to_string()),
            },
            _ => Self::internal(message, error),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind.code()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

/// A binary response body
#[derive(Debug, Clone)]
pub struct Download {
    pub file_name: String,
    pub content_type: &'static str,
    pub disposition: Disposition,
    pub bytes: Vec<u8>,
}

impl Download {
    pub fn content_disposition(&self) -> String {
        let kind = match self.disposition {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        };
        format!("{kind}; filename=\"{}\"", self.file_name)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureSummary {
    pub paragraphs: usize,
    pub tables: usize,
    pub images: usize,
    pub headings: document::HeadingCounts,
    pub total_headings: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageBreakSummary {
    pub count: usize,
    pub locations: Vec<PageBreak>,
    pub note: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub original_file: String,
    pub structure: StructureSummary,
    pub page_breaks: PageBreakSummary,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionsResponse {
    pub success: bool,
    pub original_file: String,
    pub total_sections: usize,
    pub total_paragraphs: usize,
    pub sections: Vec<SectionInfo>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub document_id: String,
    pub metadata: DocumentMetadata,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub documents: Vec<DocumentMetadata>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResponse {
    pub success: bool,
    pub document_id: String,
    pub original_name: String,
    pub output_filename: String,
    pub download_url: String,
    pub skipped_chunks: Vec<usize>,
    pub missing_chunks: Vec<usize>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub success: bool,
    pub document_id: String,
    pub message: String,
}

/// Operations behind the document endpoints
#[derive(Debug, Clone)]
pub struct DocumentService {
    store: DocumentStore,
    options: SplitOptions,
}

impl DocumentService {
    pub fn new(store: DocumentStore, options: SplitOptions) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Structure report for an uploaded file
    pub fn analyze(&self, file_name: &str, bytes: &[u8]) -> ServiceResult<AnalyzeResponse> {
        require_file(bytes)?;
        let structure = document::analyze_docx(bytes)
            .map_err(|e| ServiceError::from_docx("Failed to process DOCX file", e))?;

        let page_break_count = structure.page_breaks.len();
        Ok(AnalyzeResponse {
            success: true,
            original_file: file_name.to_string(),
            message: format!(
                "Document analyzed: {} paragraphs, {} explicit page breaks",
                structure.total_paragraphs, page_break_count
            ),
            structure: StructureSummary {
                paragraphs: structure.total_paragraphs,
                tables: structure.tables,
                images: structure.images,
                headings: structure.headings,
                total_headings: structure.headings.total(),
            },
            page_breaks: PageBreakSummary {
                count: page_break_count,
                locations: structure.page_breaks,
                note: "Only explicit page breaks are detected. The actual page count depends on rendering.",
            },
        })
    }

    /// Section grouping for an uploaded file
    pub fn analyze_sections(&self, file_name: &str, bytes: &[u8]) -> ServiceResult<SectionsResponse> {
        require_file(bytes)?;
        let report = document::analyze_sections(bytes)
            .map_err(|e| ServiceError::from_docx("Failed to process DOCX file", e))?;

        Ok(SectionsResponse {
            success: true,
            original_file: file_name.to_string(),
            total_sections: report.sections.len(),
            total_paragraphs: report.total_paragraphs,
            message: format!(
                "Document analyzed: {} section(s) found with {} total paragraphs",
                report.sections.len(),
                report.total_paragraphs
            ),
            sections: report.sections,
        })
    }

    /// Split an upload into chunks and store everything under a new id
    pub async fn upload(&self, file_name: &str, bytes: &[u8]) -> ServiceResult<UploadResponse> {
        require_file(bytes)?;
        if !file_name.to_ascii_lowercase().ends_with(".docx") {
            return Err(ServiceError::bad_request("Only DOCX files are supported"));
        }

        let document_id = storage::generate_document_id();
        let split = document::split_docx(bytes, &document_id, file_name, self.options)
            .map_err(|e| ServiceError::from_docx("Failed to upload document", e))?;

        self.store
            .save_upload(&document_id, bytes)
            .await
            .map_err(|e| ServiceError::internal("Failed to upload document", format!("{e:#}")))?;
        self.store
            .save_split(&split)
            .await
            .map_err(|e| ServiceError::internal("Failed to upload document", format!("{e:#}")))?;

        tracing::info!(
            target: TRACING_TARGET,
            document_id = %document_id,
            file_name,
            chunks = split.chunks.len(),
            "Uploaded document"
        );

        Ok(UploadResponse {
            success: true,
            message: format!("Document uploaded and split into {} chunks", split.chunks.len()),
            document_id,
            metadata: split.metadata,
        })
    }

    pub async fn list(&self) -> ServiceResult<ListResponse> {
        let documents = self
            .store
            .list_metadata()
            .await
            .map_err(|e| ServiceError::internal("Failed to list documents", format!("{e:#}")))?;
        Ok(ListResponse { documents })
    }

    pub async fn chunk(&self, document_id: &str, chunk_index: usize) -> ServiceResult<Download> {
        require_document_id(document_id)?;
        let bytes = self
            .store
            .read_chunk(document_id, chunk_index)
            .await
            .map_err(|e| ServiceError::internal("Failed to serve chunk", format!("{e:#}")))?
            .ok_or_else(|| ServiceError::not_found("Chunk not found"))?;

        Ok(Download {
            file_name: storage::chunk_file_name(chunk_index),
            content_type: DOCX_CONTENT_TYPE,
            disposition: Disposition::Inline,
            bytes,
        })
    }

    /// Merge the stored chunks of a document and store the result
    pub async fn merge(&self, document_id: &str) -> ServiceResult<MergeResponse> {
        require_document_id(document_id)?;
        let internal =
            |e: anyhow::Error| ServiceError::internal("Failed to merge document", format!("{e:#}"));

        let stored = self
            .store
            .read_chunks(document_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| ServiceError::not_found("Document not found"))?;
        if stored.is_empty() {
            return Err(ServiceError::not_found("No chunks found for document"));
        }
        let metadata = self
            .store
            .read_metadata(document_id)
            .await
            .map_err(internal)?
            .ok_or_else(|| ServiceError::not_found("Document metadata not found"))?;

        let missing_chunks = missing_chunk_indices(&stored, metadata.total_chunks);
        for &chunk_index in &missing_chunks {
            tracing::warn!(
                target: TRACING_TARGET,
                document_id,
                chunk_index,
                "Chunk file missing, its content is left out of the merge"
            );
        }

        let (indices, chunks): (Vec<usize>, Vec<Vec<u8>>) = stored.into_iter().unzip();
        let outcome = document::merge_chunks(&chunks)
            .map_err(|e| ServiceError::internal("Failed to merge document", e))?;
        // Merge positions refer to the chunks read, not to chunk indices
        let skipped_chunks: Vec<usize> = outcome
            .skipped_chunks
            .iter()
            .map(|&position| indices[position])
            .collect();

        self.store
            .save_merged(document_id, &outcome.document)
            .await
            .map_err(internal)?;

        let message = match (skipped_chunks.len(), missing_chunks.len()) {
            (0, 0) => "Document merged successfully".to_string(),
            (skipped, 0) => format!("Document merged with {skipped} unreadable chunk(s) left out"),
            (0, missing) => format!("Document merged with {missing} missing chunk(s) left out"),
            (skipped, missing) => format!(
                "Document merged with {skipped} unreadable and {missing} missing chunk(s) left out"
            ),
        };

        Ok(MergeResponse {
            success: true,
            document_id: document_id.to_string(),
            original_name: metadata.original_name,
            output_filename: DocumentStore::merged_file_name(document_id),
            download_url: format!("/api/documents/{document_id}/download"),
            skipped_chunks,
            missing_chunks,
            message,
        })
    }

    pub async fn download(&self, document_id: &str) -> ServiceResult<Download> {
        require_document_id(document_id)?;
        let bytes = self
            .store
            .read_merged(document_id)
            .await
            .map_err(|e| ServiceError::internal("Failed to download document", format!("{e:#}")))?
            .ok_or_else(|| {
                ServiceError::not_found("Merged document not found. Please merge the document first.")
            })?;

        Ok(Download {
            file_name: format!("{document_id}_final.docx"),
            content_type: DOCX_CONTENT_TYPE,
            disposition: Disposition::Attachment,
            bytes,
        })
    }

    pub async fn delete(&self, document_id: &str) -> ServiceResult<DeleteResponse> {
        require_document_id(document_id)?;
        let removed = self
            .store
            .delete_document(document_id)
            .await
            .map_err(|e| ServiceError::internal("Failed to delete document", format!("{e:#}")))?;

        if !removed {
            return Err(ServiceError::not_found("Document not found"));
        }

        Ok(DeleteResponse {
            success: true,
            document_id: document_id.to_string(),
            message: "Document deleted".to_string(),
        })
    }
}

fn require_file(bytes: &[u8]) -> ServiceResult<()> {
    if bytes.is_empty() {
        return Err(ServiceError::bad_request("No file provided"));
    }
    Ok(())
}

/// Indices below `total_chunks` with no stored chunk file
fn missing_chunk_indices(stored: &[(usize, Vec<u8>)], total_chunks: usize) -> Vec<usize> {
    (0..total_chunks)
        .filter(|chunk_index| !stored.iter().any(|(index, _)| index == chunk_index))
        .collect()
}

fn require_document_id(document_id: &str) -> ServiceResult<()> {
    if !storage::is_valid_document_id(document_id) {
        return Err(ServiceError::bad_request("Invalid document id"));
    }
    Ok(())
}
