//! Model Fetcher Port - 远程模型文件下载

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("IO error: {0}")]
    IoError(String),
}

/// Model Fetcher Port
#[async_trait]
pub trait ModelFetcherPort: Send + Sync {
    /// 下载 `url` 到 `dest`
    ///
    /// 成功返回写入的字节数。失败时 `dest` 不会留下残缺文件
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}
