//! Remote store abstraction trait.

use async_trait::async_trait;
use thiserror::Error;

/// Remote store operation errors. All recoverable at the pipeline level:
/// listing failures degrade versioning to local-only, upload failures are
/// recorded per unit.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Store backend error: {0}")]
    BackendError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Remote object store for versioned campaign outputs.
///
/// Keys follow the artifact layout `outputs/{product}/{file}` (see
/// adforge-core's names module). Implementations must treat uploads as
/// idempotent by key: an existing object is never replaced.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List all keys under a prefix.
    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>>;

    /// Whether an object exists at the key.
    async fn exists(&self, key: &str) -> StoreResult<bool>;

    /// Upload unless the key already holds an object. Returns the object URL
    /// and whether bytes were actually written (false = key already existed,
    /// which is not an error).
    async fn upload_if_absent(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StoreResult<(String, bool)>;

    /// Download an object by key.
    async fn download(&self, key: &str) -> StoreResult<Vec<u8>>;
}
