//! Voice Context - Value Objects

use std::path::{Path, PathBuf};

use super::VoiceError;

/// Piper 音色标识
///
/// 形如 `{lang}_{REGION}-{dataset}-{quality}`，例如 `de_DE-thorsten-high`
///
/// 不变量:
/// - 去除首尾空白后非空
/// - 至少 3 个 `-` 分隔的片段
/// - 第一个片段包含 `_`
/// - 不含路径分隔符（会被拼进本地路径和下载 URL）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VoiceName(String);

impl VoiceName {
    pub fn parse(raw: &str) -> Result<Self, VoiceError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(VoiceError::InvalidName("voice name is empty".to_string()));
        }
        if name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(VoiceError::InvalidName(format!(
                "voice name contains path characters: {}",
                name
            )));
        }

        let parts: Vec<&str> = name.split('-').collect();
        if parts.len() < 3 || parts.iter().take(3).any(|p| p.is_empty()) {
            return Err(VoiceError::InvalidName(format!(
                "Invalid Piper model name format: {}",
                name
            )));
        }
        if !parts[0].contains('_') {
            return Err(VoiceError::InvalidName(format!(
                "language segment must look like lang_REGION: {}",
                name
            )));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn segments(&self) -> (&str, &str, &str) {
        let mut parts = self.0.split('-');
        // parse() 保证至少 3 段
        let region = parts.next().unwrap_or_default();
        let dataset = parts.next().unwrap_or_default();
        let quality = parts.next().unwrap_or_default();
        (region, dataset, quality)
    }

    /// 语言族，例如 `de_DE` -> `de`
    pub fn language_family(&self) -> &str {
        let (region, _, _) = self.segments();
        region.split('_').next().unwrap_or(region)
    }

    /// 语言区域，例如 `de_DE`
    pub fn language_region(&self) -> &str {
        self.segments().0
    }

    pub fn dataset(&self) -> &str {
        self.segments().1
    }

    pub fn quality(&self) -> &str {
        self.segments().2
    }

    /// 模型仓库中的下载地址
    ///
    /// `{base}/{lang_family}/{lang_region}/{dataset}/{quality}/{name}.onnx[.json]`
    pub fn model_urls(&self, repository_url: &str) -> ModelUrls {
        let onnx = format!(
            "{}/{}/{}/{}/{}/{}.onnx",
            repository_url.trim_end_matches('/'),
            self.language_family(),
            self.language_region(),
            self.dataset(),
            self.quality(),
            self.0
        );
        let config = format!("{}.json", onnx);
        ModelUrls { onnx, config }
    }

    /// 本地模型文件路径
    pub fn model_files(&self, models_dir: &Path) -> ModelFiles {
        ModelFiles {
            onnx: models_dir.join(format!("{}.onnx", self.0)),
            config: models_dir.join(format!("{}.onnx.json", self.0)),
        }
    }
}

impl std::fmt::Display for VoiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 模型文件下载地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelUrls {
    pub onnx: String,
    pub config: String,
}

/// 本地模型文件对 (`.onnx` + `.onnx.json`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelFiles {
    pub onnx: PathBuf,
    pub config: PathBuf,
}

impl ModelFiles {
    pub fn both_exist(&self) -> bool {
        self.onnx.exists() && self.config.exists()
    }
}
