//! Speech Commands - 语音合成命令

use std::path::Path;
use tempfile::TempPath;

/// HTTP 同步合成命令
#[derive(Debug, Clone)]
pub struct SynthesizeSpeech {
    pub text: String,
    /// 为空时使用默认音色
    pub voice: Option<String>,
    pub response_format: String,
    pub speed: f32,
}

/// 合成结果
///
/// 持有所有临时文件，drop 时删除。HTTP 层把它放进响应体流，
/// 响应发送完毕后才释放
#[derive(Debug)]
pub struct SpeechAudio {
    file: TempPath,
    content_type: String,
    scratch: Vec<TempPath>,
}

impl SpeechAudio {
    pub fn new(file: TempPath, content_type: impl Into<String>) -> Self {
        Self {
            file,
            content_type: content_type.into(),
            scratch: Vec::new(),
        }
    }

    /// 附带一个需要同生命周期删除的中间文件
    pub fn with_scratch(mut self, scratch: TempPath) -> Self {
        self.scratch.push(scratch);
        self
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// 所有临时文件路径（返回文件在前）
    pub fn temp_paths(&self) -> Vec<&Path> {
        std::iter::once(&self.file)
            .chain(self.scratch.iter())
            .map(|p| &**p)
            .collect()
    }
}

/// Worker 合成并上传命令
#[derive(Debug, Clone)]
pub struct SynthesizeAndUpload {
    pub text: String,
}
