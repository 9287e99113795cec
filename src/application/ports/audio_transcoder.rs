//! Audio Transcoder Port - 音频转码抽象
//!
//! 将合成出的 WAV 文件转换为其他格式（mp3、opus、flac ...）

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::domain::speech::OutputFormat;

/// 转码错误
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// 转码器进程以非零状态退出
    #[error("Conversion failed: {0}")]
    ConversionFailed(String),

    /// 无法启动转码器
    #[error("Failed to run transcoder: {0}")]
    SpawnFailed(String),
}

/// 转码配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeConfig {
    /// 输出格式
    pub format: OutputFormat,
    /// 目标采样率（Hz）
    pub sample_rate: u32,
    /// 目标比特率，ffmpeg 写法（如 `64k`）
    pub bitrate: String,
    /// 声道数
    pub channels: u8,
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::wav(),
            sample_rate: 24000,
            bitrate: "64k".to_string(),
            channels: 1,
        }
    }
}

impl TranscodeConfig {
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

/// Audio Transcoder Port
#[async_trait]
pub trait AudioTranscoderPort: Send + Sync {
    /// 将 `input` (WAV) 转码写入 `output`
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        config: &TranscodeConfig,
    ) -> Result<(), TranscodeError>;
}
