//! Voice Context - Errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("无效的音色名称: {0}")]
    InvalidName(String),

    #[error("模型下载失败: {0}")]
    DownloadFailed(String),

    #[error("模型加载失败: {0}")]
    LoadFailed(String),
}
