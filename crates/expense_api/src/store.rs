use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::models::Document;

/// Persistence for the expenses document.
///
/// Every call works on the whole document: there is no partial read or
/// incremental write, and nothing is kept in memory between calls.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Writes an empty document if none exists yet. Existing files are left
    /// untouched, whatever their content.
    async fn ensure_initialized(&self) -> Result<(), StoreError>;

    /// Reads the document. A missing, unreadable or malformed file yields an
    /// empty document instead of an error.
    async fn load(&self) -> Document;

    /// Replaces the stored document in full.
    async fn save(&self, document: &Document) -> Result<(), StoreError>;
}

/// File-based implementation that keeps the document as pretty-printed JSON
pub struct FileExpenseStore {
    path: PathBuf,
}

impl FileExpenseStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the document is staged in before being renamed over the
    /// real one.
    pub fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("expenses.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn read_document(&self) -> Option<Document> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "Cannot read expenses file, using empty document");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(document) => Some(document),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "Expenses file is not a valid document, using empty document");
                None
            }
        }
    }
}

#[async_trait]
impl ExpenseStore for FileExpenseStore {
    async fn ensure_initialized(&self) -> Result<(), StoreError> {
        // An existence check that errors out counts as "missing".
        if let Ok(true) = tokio::fs::try_exists(&self.path).await {
            return Ok(());
        }

        self.save(&Document::default()).await?;
        tracing::info!(path = %self.path.display(), "Initialized expenses file");
        Ok(())
    }

    async fn load(&self) -> Document {
        self.read_document().await.unwrap_or_default()
    }

    async fn save(&self, document: &Document) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(document)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| StoreError::io(parent, err))?;
        }

        let staging = self.staging_path();
        tokio::fs::write(&staging, content)
            .await
            .map_err(|err| StoreError::io(&staging, err))?;

        if let Err(err) = tokio::fs::rename(&staging, &self.path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(StoreError::io(&self.path, err));
        }

        Ok(())
    }
}
