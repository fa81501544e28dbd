//! Whole-file persistence for the storefront document

use crate::core::{Result, ShopError};
use crate::storage::document::Document;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

// ============================================================================
// Document File
// ============================================================================

/// The on-disk JSON document.
///
/// Reads always see a complete document: saves go to a temp file in the same
/// directory which is synced and then renamed over the old one.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    path: PathBuf,
}

impl DocumentFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full document. A missing or blank file is an empty document.
    pub async fn load(&self) -> Result<Document> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "document file missing, starting empty");
                return Ok(Document::new());
            }
            Err(e) => {
                return Err(ShopError::storage(format!(
                    "Failed to read document {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::new());
        }

        let document: Document = serde_json::from_slice(&bytes)?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "document loaded");
        Ok(document)
    }

    /// Replace the document on disk with `document`.
    pub async fn save(&self, document: &Document) -> Result<()> {
        let serialized = serde_json::to_vec_pretty(document)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomically(&path, &serialized)).await??;

        debug!(path = %self.path.display(), "document saved");
        Ok(())
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

fn write_atomically(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    fs::create_dir_all(&dir)
        .map_err(|e| ShopError::storage(format!("Failed to create document directory: {}", e)))?;

    let mut temp = NamedTempFile::new_in(&dir)
        .map_err(|e| ShopError::storage(format!("Failed to create temp file: {}", e)))?;
    temp.write_all(contents)
        .map_err(|e| ShopError::storage(format!("Failed to write document: {}", e)))?;
    temp.flush()
        .map_err(|e| ShopError::storage(format!("Failed to flush document: {}", e)))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| ShopError::storage(format!("Failed to sync document: {}", e)))?;
    temp.persist(path)
        .map_err(|e| ShopError::storage(format!("Failed to replace document: {}", e.error)))?;

    Ok(())
}
