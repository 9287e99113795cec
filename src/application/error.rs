//! 应用层错误定义
//!
//! 统一的命令错误类型

use thiserror::Error;

use crate::application::ports::{StorageError, TranscodeError, TtsError};
use crate::domain::speech::SpeechError;
use crate::domain::voice::VoiceError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 输入无效（空文本、非法音色名、非法格式）
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 模型下载或加载失败
    #[error("Voice load error: {0}")]
    LoadError(String),

    /// 外部转码器失败
    #[error("Conversion error: {0}")]
    ConversionError(String),

    /// 对象存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

impl From<VoiceError> for ApplicationError {
    fn from(err: VoiceError) -> Self {
        match err {
            VoiceError::InvalidName(_) => Self::ValidationError(err.to_string()),
            VoiceError::DownloadFailed(_) | VoiceError::LoadFailed(_) => {
                Self::LoadError(err.to_string())
            }
        }
    }
}

impl From<SpeechError> for ApplicationError {
    fn from(err: SpeechError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<TtsError> for ApplicationError {
    fn from(err: TtsError) -> Self {
        Self::InternalError(format!("Synthesis failed: {}", err))
    }
}

impl From<TranscodeError> for ApplicationError {
    fn from(err: TranscodeError) -> Self {
        match err {
            TranscodeError::ConversionFailed(_) => Self::ConversionError(err.to_string()),
            TranscodeError::SpawnFailed(_) => Self::InternalError(err.to_string()),
        }
    }
}

impl From<StorageError> for ApplicationError {
    fn from(err: StorageError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<std::io::Error> for ApplicationError {
    fn from(err: std::io::Error) -> Self {
        Self::InternalError(format!("IO error: {}", err))
    }
}
