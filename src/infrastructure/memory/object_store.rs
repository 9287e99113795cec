//! In-Memory Object Store Implementation
//!
//! 本地开发和测试用的 ObjectStorePort 实现，支持注入探测 / 上传失败

use async_trait::async_trait;
use dashmap::DashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::application::ports::{ObjectStorePort, StorageError};

/// 已存储对象
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// 内存对象存储
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: DashMap<String, StoredObject>,
    fail_probes: AtomicBool,
    fail_uploads: AtomicBool,
    probe_count: AtomicUsize,
    put_count: AtomicUsize,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &str, data: Vec<u8>, content_type: &str) {
        self.objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.get(key).map(|o| o.clone())
    }

    pub fn fail_probes(&self, fail: bool) {
        self.fail_probes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn probe_count(&self) -> usize {
        self.probe_count.load(Ordering::SeqCst)
    }

    pub fn put_count(&self) -> usize {
        self.put_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStorePort for InMemoryObjectStore {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        self.probe_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_probes.load(Ordering::SeqCst) {
            return Err(StorageError::ProbeFailed("injected probe failure".to_string()));
        }
        Ok(self.objects.contains_key(key))
    }

    async fn put_file(
        &self,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.put_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed("injected upload failure".to_string()));
        }
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;
        self.insert(key, data, content_type);
        tracing::debug!(key = %key, "Object stored in memory");
        Ok(())
    }
}
