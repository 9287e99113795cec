//! Voice Context - Aggregate Root

use super::{ModelFiles, VoiceName};

/// 已加载到内存的音色
///
/// 不变量:
/// - 同一进程内每个 VoiceName 至多一个实例（由 VoiceCache 保证）
/// - files 在加载时两个文件都存在
#[derive(Debug, Clone)]
pub struct LoadedVoice {
    name: VoiceName,
    files: ModelFiles,
    sample_rate: u32,
    language: Option<String>,
}

impl LoadedVoice {
    pub fn new(name: VoiceName, files: ModelFiles, sample_rate: u32) -> Self {
        Self {
            name,
            files,
            sample_rate,
            language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn name(&self) -> &VoiceName {
        &self.name
    }

    pub fn files(&self) -> &ModelFiles {
        &self.files
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}
