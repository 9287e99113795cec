//! Object Store Port - S3 兼容对象存储抽象
//!
//! Worker 用它做内容寻址缓存：先探测 key 是否存在，再上传

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Object Store Port
#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    /// 对象是否存在
    ///
    /// - `Ok(true)`: 存在
    /// - `Ok(false)`: 明确的 "not found"
    /// - `Err`: 其他任何探测错误
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// 上传本地文件
    async fn put_file(&self, key: &str, path: &Path, content_type: &str)
        -> Result<(), StorageError>;
}
