//! Remote-aware version allocation for output artifacts.
//!
//! The next version for a (product, ratio) key is one past the highest
//! version visible locally or remotely. Remote listings are fetched once
//! per product prefix and cached for the run; a listing failure degrades
//! that prefix to local-only counting for the rest of the run.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use adforge_core::models::AspectRatio;
use adforge_core::names::{self, normalize_name};
use adforge_storage::RemoteStore;

/// An allocated version plus whether remote state was consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatedVersion {
    pub version: u32,
    /// True when the remote listing failed and only local files were counted.
    pub remote_degraded: bool,
}

pub struct VersionAllocator {
    outputs_dir: PathBuf,
    remote: Option<Arc<dyn RemoteStore>>,
    /// Per (product, ratio) key locks so concurrent allocations for the same
    /// key serialize and never hand out duplicate versions.
    key_locks: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Remote listing per product prefix, fetched at most once per run.
    /// None records a failed listing (degraded for the rest of the run).
    listing_cache: Mutex<HashMap<String, Option<Vec<String>>>>,
    /// High-water mark of versions already handed out per key. Callers write
    /// the artifact file after allocation, so the filesystem alone cannot
    /// tell a second allocation what the first one received.
    issued: std::sync::Mutex<HashMap<String, u32>>,
}

impl VersionAllocator {
    pub fn new(outputs_dir: impl Into<PathBuf>, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self {
            outputs_dir: outputs_dir.into(),
            remote,
            key_locks: std::sync::Mutex::new(HashMap::new()),
            listing_cache: Mutex::new(HashMap::new()),
            issued: std::sync::Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.key_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(key.to_string()).or_default().clone()
    }

    /// Allocate the next version for a (product, ratio) key.
    pub async fn next_version(&self, product: &str, ratio: AspectRatio) -> AllocatedVersion {
        let key = format!("{}/{}", normalize_name(product), ratio.label());
        let lock = self.lock_for(&key);
        let _guard = lock.lock().await;

        let local_max = self.scan_local(product, ratio).await;
        let (remote_max, degraded) = self.scan_remote(product, ratio).await;

        // Versions already handed out this run count too: the caller writes
        // the file only after allocation, so without this a second same-key
        // allocation would rescan identical state and repeat the number.
        let mut issued = self.issued.lock().unwrap_or_else(|e| e.into_inner());
        let issued_max = issued.get(&key).copied().unwrap_or(0);
        let version = local_max.max(remote_max).max(issued_max) + 1;
        issued.insert(key, version);

        debug!(product, ratio = %ratio, local_max, remote_max, issued_max, version, "allocated version");
        AllocatedVersion {
            version,
            remote_degraded: degraded,
        }
    }

    async fn scan_local(&self, product: &str, ratio: AspectRatio) -> u32 {
        let dir = self.outputs_dir.join(normalize_name(product));
        let mut max = 0;
        let Ok(mut entries) = tokio::fs::read_dir(&dir).await else {
            return 0;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if let Some(v) = names::parse_artifact_version(name, product, ratio) {
                max = max.max(v);
            }
        }
        max
    }

    /// Highest remote version for the key, plus whether the listing was
    /// unavailable.
    async fn scan_remote(&self, product: &str, ratio: AspectRatio) -> (u32, bool) {
        let Some(remote) = &self.remote else {
            return (0, false);
        };
        let prefix = format!("outputs/{}/", normalize_name(product));

        let mut cache = self.listing_cache.lock().await;
        if !cache.contains_key(&prefix) {
            let listing = match remote.list(&prefix).await {
                Ok(keys) => Some(keys),
                Err(e) => {
                    warn!(prefix = %prefix, error = %e,
                        "remote listing failed, version counting degraded to local-only");
                    None
                }
            };
            cache.insert(prefix.clone(), listing);
        }

        match cache.get(&prefix) {
            Some(Some(keys)) => {
                let max = keys
                    .iter()
                    .filter_map(|k| names::parse_artifact_version(k, product, ratio))
                    .max()
                    .unwrap_or(0);
                (max, false)
            }
            _ => (0, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adforge_storage::{InMemoryStore, StoreError, StoreResult};
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl RemoteStore for FailingStore {
        async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
            Err(StoreError::ListFailed(prefix.to_string()))
        }
        async fn exists(&self, _key: &str) -> StoreResult<bool> {
            Ok(false)
        }
        async fn upload_if_absent(
            &self,
            key: &str,
            _data: Vec<u8>,
            _content_type: &str,
        ) -> StoreResult<(String, bool)> {
            Ok((format!("mem://{}", key), true))
        }
        async fn download(&self, key: &str) -> StoreResult<Vec<u8>> {
            Err(StoreError::NotFound(key.to_string()))
        }
    }

    async fn seed_local(dir: &std::path::Path, files: &[&str]) {
        let product_dir = dir.join("product_a");
        tokio::fs::create_dir_all(&product_dir).await.unwrap();
        for f in files {
            tokio::fs::write(product_dir.join(f), b"x").await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_first_version_is_one() {
        let tmp = tempfile::tempdir().unwrap();
        let allocator = VersionAllocator::new(tmp.path(), None);
        let v = allocator.next_version("Product A", AspectRatio::Wide).await;
        assert_eq!(v.version, 1);
        assert!(!v.remote_degraded);
    }

    #[tokio::test]
    async fn test_max_of_local_and_remote_plus_one() {
        let tmp = tempfile::tempdir().unwrap();
        seed_local(tmp.path(), &["product_a_16x9_v1.png", "product_a_16x9_v2.png"]).await;

        let store = Arc::new(InMemoryStore::new());
        store.seed("outputs/product_a/product_a_16x9_v5.png", vec![1]);

        let allocator = VersionAllocator::new(tmp.path(), Some(store));
        let v = allocator.next_version("Product A", AspectRatio::Wide).await;
        assert_eq!(v.version, 6);
        assert!(!v.remote_degraded);
    }

    #[tokio::test]
    async fn test_other_ratio_and_foreign_files_ignored() {
        let tmp = tempfile::tempdir().unwrap();
        seed_local(
            tmp.path(),
            &[
                "product_a_16x9_v7.png",
                "product_a_1x1_v9.png",
                "product_a_2_16x9_v20.png",
                "notes.txt",
            ],
        )
        .await;
        let allocator = VersionAllocator::new(tmp.path(), None);
        let v = allocator.next_version("Product A", AspectRatio::Wide).await;
        assert_eq!(v.version, 8);
    }

    #[tokio::test]
    async fn test_remote_failure_degrades_to_local_only() {
        let tmp = tempfile::tempdir().unwrap();
        seed_local(tmp.path(), &["product_a_16x9_v3.png"]).await;
        let allocator = VersionAllocator::new(tmp.path(), Some(Arc::new(FailingStore)));
        let v = allocator.next_version("Product A", AspectRatio::Wide).await;
        assert_eq!(v.version, 4);
        assert!(v.remote_degraded);
    }

    #[tokio::test]
    async fn test_repeated_allocations_are_distinct_before_any_write() {
        // The artifact file lands on disk only after allocation, so the
        // allocator must remember what it handed out, not just rescan.
        let tmp = tempfile::tempdir().unwrap();
        let allocator = VersionAllocator::new(tmp.path(), None);

        let mut versions = Vec::new();
        for _ in 0..4 {
            let v = allocator.next_version("Product A", AspectRatio::Wide).await;
            versions.push(v.version);
        }
        assert_eq!(versions, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_concurrent_allocations_for_same_key_are_distinct() {
        let tmp = tempfile::tempdir().unwrap();
        let allocator = Arc::new(VersionAllocator::new(tmp.path(), None));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let allocator = allocator.clone();
                tokio::spawn(async move {
                    allocator
                        .next_version("Product A", AspectRatio::Wide)
                        .await
                        .version
                })
            })
            .collect();
        let mut versions = Vec::new();
        for task in tasks {
            versions.push(task.await.unwrap());
        }
        versions.sort_unstable();
        assert_eq!(versions, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[tokio::test]
    async fn test_issued_versions_build_on_existing_history() {
        let tmp = tempfile::tempdir().unwrap();
        seed_local(tmp.path(), &["product_a_16x9_v3.png"]).await;
        let allocator = VersionAllocator::new(tmp.path(), None);
        let first = allocator.next_version("Product A", AspectRatio::Wide).await;
        let second = allocator.next_version("Product A", AspectRatio::Wide).await;
        assert_eq!(first.version, 4);
        assert_eq!(second.version, 5);
    }
}
