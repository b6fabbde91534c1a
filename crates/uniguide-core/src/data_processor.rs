use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::chunker::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, SourceDocument};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding pre-extracted document text.
    pub docs_dir: String,
    /// File extensions (without dot) picked up from `docs_dir`.
    pub extensions: Vec<String>,
    /// Prefix for document links in replies, e.g. `http://host/documents`.
    pub base_doc_url: Option<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            docs_dir: "data".to_string(),
            extensions: vec!["txt".to_string(), "md".to_string()],
            base_doc_url: Some("http://127.0.0.1:8000/documents".to_string()),
        }
    }
}

/// Reads extracted text files from disk. PDF/OCR extraction happens upstream.
pub struct DocumentLoader {
    extensions: Vec<String>,
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new(&DataConfig::default().extensions)
    }
}

impl DocumentLoader {
    pub fn new(extensions: &[String]) -> Self {
        Self { extensions: extensions.iter().map(|e| e.trim_start_matches('.').to_ascii_lowercase()).collect() }
    }

    pub fn load_directory(&self, data_dir: &Path) -> Result<Vec<SourceDocument>> {
        if !data_dir.is_dir() {
            return Err(Error::NotFound(format!("document folder {}", data_dir.display())));
        }
        let files = self.list_files(data_dir);
        if files.is_empty() {
            warn!(dir = %data_dir.display(), "no documents found");
            return Ok(vec![]);
        }
        let mut documents = Vec::with_capacity(files.len());
        for file_path in &files {
            let text = match read_file_content(file_path) {
                Ok(text) => text,
                Err(err) => {
                    warn!(path = %file_path.display(), error = %err, "skipping unreadable document");
                    continue;
                }
            };
            documents.push(SourceDocument { source: source_id(file_path), text });
        }
        info!(count = documents.len(), dir = %data_dir.display(), "loaded documents");
        Ok(documents)
    }

    fn list_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|s| s.to_str())
                    .is_some_and(|ext| self.extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
            })
            .collect();
        files.sort();
        files
    }
}

/// Split every document and tag the resulting chunks with their source.
pub fn chunk_documents(documents: &[SourceDocument], chunking: &ChunkingConfig) -> Result<Vec<Chunk>> {
    chunking.validate()?;
    let mut chunks = Vec::new();
    for doc in documents {
        let pieces = chunking.split(&doc.text)?;
        info!(source = %doc.source, chunks = pieces.len(), "chunked document");
        chunks.extend(pieces.into_iter().map(|text| Chunk::new(text, doc.source.clone())));
    }
    info!(documents = documents.len(), chunks = chunks.len(), "corpus chunked");
    Ok(chunks)
}

fn read_file_content(file_path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(file_path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

fn source_id(file_path: &Path) -> String {
    file_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.to_string_lossy().into_owned())
}
