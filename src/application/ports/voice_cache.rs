//! Voice Cache Port - 音色加载缓存
//!
//! 每个音色标识在进程生命周期内只下载、加载一次

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::voice::{LoadedVoice, VoiceError};

/// Voice Cache Port
#[async_trait]
pub trait VoiceCachePort: Send + Sync {
    /// 获取音色，未命中时下载缺失的模型文件并加载
    ///
    /// 同一标识的并发首次请求只触发一次下载 + 加载
    async fn get_voice(&self, name: &str) -> Result<Arc<LoadedVoice>, VoiceError>;

    /// 当前已加载的音色标识（排序后）
    fn loaded_voices(&self) -> Vec<String>;

    /// 释放所有已加载音色（进程退出时调用）
    fn clear(&self);
}
