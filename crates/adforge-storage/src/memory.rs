//! In-memory remote store: test double and backend for storeless local runs.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::traits::{RemoteStore, StoreError, StoreResult};

#[derive(Default)]
pub struct InMemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object, e.g. pre-existing remote version history in tests.
    pub fn seed(&self, key: &str, data: Vec<u8>) {
        self.objects.lock().unwrap().insert(key.to_string(), data);
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn exists(&self, key: &str) -> StoreResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn upload_if_absent(
        &self,
        key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StoreResult<(String, bool)> {
        let mut objects = self.objects.lock().unwrap();
        let url = format!("memory://{key}");
        if objects.contains_key(key) {
            return Ok((url, false));
        }
        objects.insert(key.to_string(), data);
        Ok((url, true))
    }

    async fn download(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_is_idempotent_by_key() {
        let store = InMemoryStore::new();
        let (_, written) = store
            .upload_if_absent("outputs/a/a_1x1_v1.png", vec![1], "image/png")
            .await
            .unwrap();
        assert!(written);
        let (_, written) = store
            .upload_if_absent("outputs/a/a_1x1_v1.png", vec![2], "image/png")
            .await
            .unwrap();
        assert!(!written);
        // First write wins; exactly one object at the key.
        assert_eq!(store.object_count(), 1);
        assert_eq!(store.get("outputs/a/a_1x1_v1.png"), Some(vec![1]));
    }

    #[tokio::test]
    async fn test_list_filters_by_prefix() {
        let store = InMemoryStore::new();
        store.seed("outputs/a/a_1x1_v1.png", vec![]);
        store.seed("outputs/a/a_16x9_v1.png", vec![]);
        store.seed("outputs/b/b_1x1_v1.png", vec![]);
        let keys = store.list("outputs/a/").await.unwrap();
        assert_eq!(keys.len(), 2);
    }

    #[tokio::test]
    async fn test_download_missing_is_not_found() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.download("nope").await,
            Err(StoreError::NotFound(_))
        ));
    }
}
