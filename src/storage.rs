//! Filesystem storage for originals, chunks and merged documents
//!
//! Layout under the storage root:
//!
//! ```text
//! documents/<id>.docx
//! documents_chunks/<id>/chunk_<index>.docx
//! documents_chunks/<id>/metadata.json
//! documents_ready/<id>_merged.docx
//! ```

use anyhow::{bail, Context, Result};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Reverse;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::document::{DocumentMetadata, SplitResult};

const TRACING_TARGET: &str = "docx_chunker::storage";

pub const METADATA_FILE: &str = "metadata.json";

static CHUNK_FILE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^chunk_(\d+)\.docx$").unwrap());

static DOCUMENT_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

pub fn chunk_file_name(chunk_index: usize) -> String {
    format!("chunk_{chunk_index}.docx")
}

/// Chunk index encoded in a `chunk_<index>.docx` file name
pub fn parse_chunk_index(file_name: &str) -> Option<usize> {
    CHUNK_FILE_PATTERN
        .captures(file_name)
        .and_then(|captures| captures.get(1))
        .and_then(|index| index.as_str().parse().ok())
}

/// Keep chunk files only, ordered by their numeric index (chunk_2 before chunk_10)
pub fn sort_chunk_files(file_names: Vec<String>) -> Vec<(usize, String)> {
    let mut chunks: Vec<(usize, String)> = file_names
        .into_iter()
        .filter_map(|name| parse_chunk_index(&name).map(|index| (index, name)))
        .collect();
    chunks.sort_by_key(|(index, _)| *index);
    chunks
}

/// Generate a document id such as `doc_1760875200000_k3x9qa`
pub fn generate_document_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut random = uuid::Uuid::new_v4().as_u128();
    let mut suffix = String::with_capacity(6);
    for _ in 0..6 {
        suffix.push(ALPHABET[(random % 36) as usize] as char);
        random /= 36;
    }

    format!("doc_{}_{}", Utc::now().timestamp_millis(), suffix)
}

/// Document ids become path components, so only a safe alphabet is allowed
pub fn is_valid_document_id(document_id: &str) -> bool {
    DOCUMENT_ID_PATTERN.is_match(document_id)
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn originals_dir(&self) -> PathBuf {
        self.root.join("documents")
    }

    fn chunks_base_dir(&self) -> PathBuf {
        self.root.join("documents_chunks")
    }

    fn ready_dir(&self) -> PathBuf {
        self.root.join("documents_ready")
    }

    pub fn original_path(&self, document_id: &str) -> PathBuf {
        self.originals_dir().join(format!("{document_id}.docx"))
    }

    pub fn chunks_dir(&self, document_id: &str) -> PathBuf {
        self.chunks_base_dir().join(document_id)
    }

    pub fn chunk_path(&self, document_id: &str, chunk_index: usize) -> PathBuf {
        self.chunks_dir(document_id).join(chunk_file_name(chunk_index))
    }

    pub fn metadata_path(&self, document_id: &str) -> PathBuf {
        self.chunks_dir(document_id).join(METADATA_FILE)
    }

    pub fn merged_file_name(document_id: &str) -> String {
        format!("{document_id}_merged.docx")
    }

    pub fn merged_path(&self, document_id: &str) -> PathBuf {
        self.ready_dir().join(Self::merged_file_name(document_id))
    }

    /// Store the uploaded original
    pub async fn save_upload(&self, document_id: &str, bytes: &[u8]) -> Result<PathBuf> {
        check_document_id(document_id)?;
        fs::create_dir_all(self.originals_dir()).await?;

        let path = self.original_path(document_id);
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Store chunk archives and metadata, replacing any earlier split
    pub async fn save_split(&self, split: &SplitResult) -> Result<()> {
        let document_id = split.metadata.document_id.as_str();
        check_document_id(document_id)?;

        let dir = self.chunks_dir(document_id);
        fs::create_dir_all(&dir).await?;

        for (_, stale) in sort_chunk_files(list_file_names(&dir).await?) {
            fs::remove_file(dir.join(stale)).await?;
        }

        for (chunk_index, chunk) in split.chunks.iter().enumerate() {
            let path = self.chunk_path(document_id, chunk_index);
            fs::write(&path, chunk)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }

        let metadata = serde_json::to_string_pretty(&split.metadata)?;
        fs::write(self.metadata_path(document_id), metadata).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            document_id,
            chunks = split.chunks.len(),
            "Stored split"
        );
        Ok(())
    }

    pub async fn read_metadata(&self, document_id: &str) -> Result<Option<DocumentMetadata>> {
        check_document_id(document_id)?;

        let path = self.metadata_path(document_id);
        let Some(content) = read_optional(&path).await? else {
            return Ok(None);
        };

        let metadata = serde_json::from_slice(&content)
            .with_context(|| format!("Invalid metadata in {}", path.display()))?;
        Ok(Some(metadata))
    }

    /// All stored metadata records, newest upload first
    pub async fn list_metadata(&self) -> Result<Vec<DocumentMetadata>> {
        let base = self.chunks_base_dir();
        let mut entries = match fs::read_dir(&base).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut documents = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path().join(METADATA_FILE);
            let Some(content) = read_optional(&path).await? else {
                continue;
            };

            match serde_json::from_slice::<DocumentMetadata>(&content) {
                Ok(metadata) => documents.push(metadata),
                Err(error) => tracing::warn!(
                    target: TRACING_TARGET,
                    path = %path.display(),
                    error = %error,
                    "Skipping unreadable metadata"
                ),
            }
        }

        documents.sort_by_key(|metadata| Reverse(metadata.uploaded_at));
        Ok(documents)
    }

    pub async fn read_chunk(
        &self,
        document_id: &str,
        chunk_index: usize,
    ) -> Result<Option<Vec<u8>>> {
        check_document_id(document_id)?;
        read_optional(&self.chunk_path(document_id, chunk_index)).await
    }

    /// All chunk archives with their indices in ascending order, or `None`
    /// when the document has no chunk directory
    pub async fn read_chunks(&self, document_id: &str) -> Result<Option<Vec<(usize, Vec<u8>)>>> {
        check_document_id(document_id)?;

        let dir = self.chunks_dir(document_id);
        if !fs::try_exists(&dir).await? {
            return Ok(None);
        }

        let mut chunks = Vec::new();
        for (chunk_index, file_name) in sort_chunk_files(list_file_names(&dir).await?) {
            let path = dir.join(&file_name);
            let bytes = fs::read(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            chunks.push((chunk_index, bytes));
        }
        Ok(Some(chunks))
    }

    pub async fn save_merged(&self, document_id: &str, bytes: &[u8]) -> Result<PathBuf> {
        check_document_id(document_id)?;
        fs::create_dir_all(self.ready_dir()).await?;

        let path = self.merged_path(document_id);
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub async fn read_merged(&self, document_id: &str) -> Result<Option<Vec<u8>>> {
        check_document_id(document_id)?;
        read_optional(&self.merged_path(document_id)).await
    }

    /// Remove every stored artifact of a document. Returns whether anything existed.
    pub async fn delete_document(&self, document_id: &str) -> Result<bool> {
        check_document_id(document_id)?;

        let mut removed = false;
        match fs::remove_dir_all(self.chunks_dir(document_id)).await {
            Ok(()) => removed = true,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        for path in [self.original_path(document_id), self.merged_path(document_id)] {
            match fs::remove_file(&path).await {
                Ok(()) => removed = true,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        if removed {
            tracing::info!(target: TRACING_TARGET, document_id, "Deleted document");
        }
        Ok(removed)
    }
}

fn check_document_id(document_id: &str) -> Result<()> {
    if !is_valid_document_id(document_id) {
        bail!("Invalid document id: {document_id:?}");
    }
    Ok(())
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to read {}", path.display()))),
    }
}

async fn list_file_names(dir: &Path) -> Result<Vec<String>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}
