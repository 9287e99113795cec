//! TTS Engine Port - TTS 推理引擎抽象
//!
//! 定义音色加载与波形合成的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::domain::voice::{LoadedVoice, ModelFiles, VoiceName};

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Invalid voice config: {0}")]
    InvalidConfig(String),

    #[error("Model file missing: {0}")]
    ModelMissing(String),

    #[error("Engine process error: {0}")]
    ProcessError(String),

    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// 合成参数
#[derive(Debug, Clone, Copy, Default)]
pub struct SynthesisOptions {
    /// 音素时长缩放（1 / speed）。None 表示使用模型默认值
    pub length_scale: Option<f32>,
}

/// 合成结果的音频信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInfo {
    /// 时长（毫秒）
    pub duration_ms: u64,
    /// 采样率
    pub sample_rate: u32,
    /// 声道数
    pub channels: u8,
}

/// TTS Engine Port
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 从本地模型文件加载音色
    async fn load_voice(&self, name: &VoiceName, files: &ModelFiles)
        -> Result<LoadedVoice, TtsError>;

    /// 合成 WAV 到指定路径（文件由调用方创建和清理）
    async fn synthesize(
        &self,
        voice: &LoadedVoice,
        text: &str,
        output: &Path,
        options: SynthesisOptions,
    ) -> Result<AudioInfo, TtsError>;
}
