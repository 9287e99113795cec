//! Speech Context - Value Objects

use super::SpeechError;
use crate::domain::voice::VoiceName;

/// 待合成文本
///
/// 不变量: 去除空白后非空。内部保存原始文本（缓存 key 基于原文计算）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechText(String);

impl SpeechText {
    pub fn new(text: impl Into<String>) -> Result<Self, SpeechError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 日志用的截断预览
    pub fn preview(&self) -> String {
        const PREVIEW_CHARS: usize = 30;
        let mut preview: String = self.0.chars().take(PREVIEW_CHARS).collect();
        if self.0.chars().count() > PREVIEW_CHARS {
            preview.push_str("...");
        }
        preview
    }
}

/// 输出音频格式
///
/// `wav` 直接返回合成结果，其他格式交给外部转码器。
/// 只接受 ASCII 字母数字（会被用作文件后缀和 Content-Type）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFormat(String);

impl OutputFormat {
    pub fn parse(raw: &str) -> Result<Self, SpeechError> {
        let format = raw.trim().to_ascii_lowercase();
        if format.is_empty() || !format.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(SpeechError::InvalidFormat(raw.to_string()));
        }
        Ok(Self(format))
    }

    pub fn wav() -> Self {
        Self("wav".to_string())
    }

    pub fn is_wav(&self) -> bool {
        self.0 == "wav"
    }

    pub fn extension(&self) -> &str {
        &self.0
    }

    pub fn content_type(&self) -> String {
        match self.0.as_str() {
            "mp3" => "audio/mpeg".to_string(),
            other => format!("audio/{}", other),
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::wav()
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 对象存储中的缓存 key
///
/// `tts_{md5("{voice}_{text}")}.wav`，仅由音色和原始文本决定
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_speech(voice: &VoiceName, text: &SpeechText) -> Self {
        let digest = md5::compute(format!("{}_{}", voice, text.as_str()).as_bytes());
        Self(format!("tts_{:x}.wav", digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thorsten() -> VoiceName {
        VoiceName::parse("de_DE-thorsten-high").unwrap()
    }

    #[test]
    fn test_speech_text_rejects_blank() {
        assert!(SpeechText::new("").is_err());
        assert!(SpeechText::new(" \n\t ").is_err());
        assert_eq!(SpeechText::new(" Hallo ").unwrap().as_str(), " Hallo ");
    }

    #[test]
    fn test_preview_truncates() {
        let text = SpeechText::new("a".repeat(40)).unwrap();
        assert_eq!(text.preview(), format!("{}...", "a".repeat(30)));
        assert_eq!(SpeechText::new("kurz").unwrap().preview(), "kurz");
    }

    #[test]
    fn test_output_format_content_type() {
        assert_eq!(OutputFormat::parse("wav").unwrap().content_type(), "audio/wav");
        assert_eq!(OutputFormat::parse("MP3").unwrap().content_type(), "audio/mpeg");
        assert_eq!(OutputFormat::parse("opus").unwrap().content_type(), "audio/opus");
        assert!(OutputFormat::parse("WAV").unwrap().is_wav());
    }

    #[test]
    fn test_output_format_rejects_odd_input() {
        assert!(OutputFormat::parse("").is_err());
        assert!(OutputFormat::parse("../mp3").is_err());
        assert!(OutputFormat::parse("audio/mpeg").is_err());
    }

    #[test]
    fn test_cache_key_known_value() {
        let key = CacheKey::for_speech(&thorsten(), &SpeechText::new("Hallo").unwrap());
        assert_eq!(key.as_str(), "tts_7cc3898d2325af6b4eaf55ce838568bd.wav");
    }

    #[test]
    fn test_cache_key_depends_on_voice_and_text() {
        let text = SpeechText::new("Hallo").unwrap();
        let same = CacheKey::for_speech(&thorsten(), &text);
        assert_eq!(same, CacheKey::for_speech(&thorsten(), &text));

        let other_text = CacheKey::for_speech(&thorsten(), &SpeechText::new("Hallo!").unwrap());
        assert_ne!(same, other_text);

        let other_voice = VoiceName::parse("de_DE-thorsten-medium").unwrap();
        assert_ne!(same, CacheKey::for_speech(&other_voice, &text));
    }
}
