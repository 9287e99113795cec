//! Piper Engine - 调用 piper 可执行文件进行合成
//!
//! 实现 TtsEnginePort：
//! - load_voice: 校验模型文件并解析 `.onnx.json` 配置
//! - synthesize: `piper --model .. --config .. --output_file ..`，文本经 stdin 传入

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::wav::probe_wav;
use crate::application::ports::{AudioInfo, SynthesisOptions, TtsEnginePort, TtsError};
use crate::domain::voice::{LoadedVoice, ModelFiles, VoiceName};

/// `.onnx.json` 中我们关心的部分
#[derive(Debug, Deserialize)]
struct PiperVoiceConfig {
    audio: PiperAudioSection,
    #[serde(default)]
    espeak: Option<PiperEspeakSection>,
}

#[derive(Debug, Deserialize)]
struct PiperAudioSection {
    sample_rate: u32,
}

#[derive(Debug, Deserialize)]
struct PiperEspeakSection {
    voice: String,
}

/// Piper 引擎配置
#[derive(Debug, Clone)]
pub struct PiperEngineConfig {
    /// piper 可执行文件路径
    pub binary: String,
}

impl Default for PiperEngineConfig {
    fn default() -> Self {
        Self {
            binary: "piper".to_string(),
        }
    }
}

/// Piper 引擎
pub struct PiperEngine {
    config: PiperEngineConfig,
}

impl PiperEngine {
    pub fn new(config: PiperEngineConfig) -> Self {
        Self { config }
    }

    /// piper 按行切分 utterance，--output_file 只保留一个文件，所以先压成单行
    fn single_line(text: &str) -> String {
        text.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn parse_voice_config(raw: &str) -> Result<PiperVoiceConfig, TtsError> {
        serde_json::from_str(raw).map_err(|e| TtsError::InvalidConfig(e.to_string()))
    }
}

#[async_trait]
impl TtsEnginePort for PiperEngine {
    async fn load_voice(
        &self,
        name: &VoiceName,
        files: &ModelFiles,
    ) -> Result<LoadedVoice, TtsError> {
        if !files.onnx.exists() {
            return Err(TtsError::ModelMissing(files.onnx.display().to_string()));
        }

        let raw = tokio::fs::read_to_string(&files.config)
            .await
            .map_err(|e| TtsError::ModelMissing(format!("{}: {}", files.config.display(), e)))?;
        let config = Self::parse_voice_config(&raw)?;

        let mut voice = LoadedVoice::new(name.clone(), files.clone(), config.audio.sample_rate);
        if let Some(espeak) = config.espeak {
            voice = voice.with_language(espeak.voice);
        }

        tracing::debug!(
            voice = %name,
            sample_rate = voice.sample_rate(),
            language = ?voice.language(),
            "Piper voice loaded"
        );

        Ok(voice)
    }

    async fn synthesize(
        &self,
        voice: &LoadedVoice,
        text: &str,
        output: &Path,
        options: SynthesisOptions,
    ) -> Result<AudioInfo, TtsError> {
        let mut command = Command::new(&self.config.binary);
        command
            .arg("--model")
            .arg(&voice.files().onnx)
            .arg("--config")
            .arg(&voice.files().config)
            .arg("--output_file")
            .arg(output);
        if let Some(length_scale) = options.length_scale {
            command.arg("--length_scale").arg(format!("{:.3}", length_scale));
        }

        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                TtsError::ProcessError(format!("Failed to start {}: {}", self.config.binary, e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let line = format!("{}\n", Self::single_line(text));
            stdin
                .write_all(line.as_bytes())
                .await
                .map_err(|e| TtsError::IoError(e.to_string()))?;
            // drop 关闭管道，piper 读到 EOF 后退出
        }

        let result = child
            .wait_with_output()
            .await
            .map_err(|e| TtsError::ProcessError(e.to_string()))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(TtsError::ProcessError(format!(
                "piper exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        let info = probe_wav(output)?;
        tracing::debug!(
            voice = %voice.name(),
            duration_ms = info.duration_ms,
            sample_rate = info.sample_rate,
            "Piper synthesis finished"
        );

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_single_line() {
        assert_eq!(
            PiperEngine::single_line("Guten Tag.\n\n  Wie geht's?\r\n"),
            "Guten Tag. Wie geht's?"
        );
    }

    #[test]
    fn test_parse_voice_config() {
        let raw = r#"{
            "audio": {"sample_rate": 22050, "quality": "high"},
            "espeak": {"voice": "de"},
            "num_speakers": 1
        }"#;
        let config = PiperEngine::parse_voice_config(raw).unwrap();
        assert_eq!(config.audio.sample_rate, 22050);
        assert_eq!(config.espeak.unwrap().voice, "de");

        assert!(PiperEngine::parse_voice_config("{}").is_err());
    }

    #[tokio::test]
    async fn test_load_voice_reads_config() {
        let dir = tempdir().unwrap();
        let name = VoiceName::parse("de_DE-thorsten-high").unwrap();
        let files = name.model_files(dir.path());
        std::fs::write(&files.onnx, b"onnx").unwrap();
        std::fs::write(
            &files.config,
            br#"{"audio": {"sample_rate": 22050}, "espeak": {"voice": "de"}}"#,
        )
        .unwrap();

        let engine = PiperEngine::new(PiperEngineConfig::default());
        let voice = engine.load_voice(&name, &files).await.unwrap();
        assert_eq!(voice.sample_rate(), 22050);
        assert_eq!(voice.language(), Some("de"));
    }

    #[tokio::test]
    async fn test_load_voice_requires_model_files() {
        let dir = tempdir().unwrap();
        let name = VoiceName::parse("de_DE-thorsten-high").unwrap();
        let files = name.model_files(dir.path());

        let engine = PiperEngine::new(PiperEngineConfig::default());
        let err = engine.load_voice(&name, &files).await.unwrap_err();
        assert!(matches!(err, TtsError::ModelMissing(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_process_error() {
        let dir = tempdir().unwrap();
        let name = VoiceName::parse("de_DE-thorsten-high").unwrap();
        let files = name.model_files(dir.path());
        let voice = LoadedVoice::new(name, files, 22050);

        let engine = PiperEngine::new(PiperEngineConfig {
            binary: dir.path().join("no-such-piper").display().to_string(),
        });
        let err = engine
            .synthesize(
                &voice,
                "Hallo",
                &dir.path().join("out.wav"),
                SynthesisOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TtsError::ProcessError(_)));
    }
}
