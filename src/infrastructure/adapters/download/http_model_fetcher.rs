//! HTTP Model Fetcher - 从模型仓库下载 Piper 音色文件
//!
//! 流式写入 `{dest}.part`，完成后 rename 为正式文件名，
//! 中途失败会删除 `.part`，不会留下残缺模型

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::application::ports::{FetchError, ModelFetcherPort};

/// HTTP 下载器配置
#[derive(Debug, Clone)]
pub struct HttpModelFetcherConfig {
    /// 建立连接的超时（秒）。模型文件很大，整体下载不设超时
    pub connect_timeout_secs: u64,
}

impl Default for HttpModelFetcherConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
        }
    }
}

/// HTTP 模型下载器
pub struct HttpModelFetcher {
    client: Client,
}

impl HttpModelFetcher {
    pub fn new(config: HttpModelFetcherConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        Ok(Self { client })
    }

    fn part_path(dest: &Path) -> PathBuf {
        let mut name = dest.as_os_str().to_owned();
        name.push(".part");
        PathBuf::from(name)
    }

    async fn download_to(&self, url: &str, part: &Path) -> Result<u64, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let mut file = tokio::fs::File::create(part)
            .await
            .map_err(|e| FetchError::IoError(e.to_string()))?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::NetworkError(e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| FetchError::IoError(e.to_string()))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| FetchError::IoError(e.to_string()))?;

        Ok(written)
    }
}

#[async_trait]
impl ModelFetcherPort for HttpModelFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let part = Self::part_path(dest);
        tracing::info!(url = %url, dest = %dest.display(), "Downloading model file");

        match self.download_to(url, &part).await {
            Ok(bytes) => {
                tokio::fs::rename(&part, dest)
                    .await
                    .map_err(|e| FetchError::IoError(e.to_string()))?;
                tracing::info!(dest = %dest.display(), bytes, "Model file downloaded");
                Ok(bytes)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&part).await;
                tracing::error!(url = %url, error = %e, "Model download failed");
                Err(e)
            }
        }
    }
}
