//! FFmpeg Transcoder - 调用 ffmpeg 做格式转换
//!
//! 输出格式由目标文件扩展名决定，参数固定为：
//! `ffmpeg -y -hide_banner -loglevel error -i in -ac N -ar RATE -b:a BITRATE out`

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::application::ports::{AudioTranscoderPort, TranscodeConfig, TranscodeError};

/// FFmpeg 转码器
pub struct FfmpegTranscoder {
    ffmpeg_path: String,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    fn build_args(input: &Path, output: &Path, config: &TranscodeConfig) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-ac".to_string(),
            config.channels.to_string(),
            "-ar".to_string(),
            config.sample_rate.to_string(),
            "-b:a".to_string(),
            config.bitrate.clone(),
            output.display().to_string(),
        ]
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl AudioTranscoderPort for FfmpegTranscoder {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        config: &TranscodeConfig,
    ) -> Result<(), TranscodeError> {
        let args = Self::build_args(input, output, config);

        let result = Command::new(&self.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                TranscodeError::SpawnFailed(format!("{}: {}", self.ffmpeg_path, e))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            tracing::warn!(
                format = %config.format,
                status = %result.status,
                stderr = %stderr.trim(),
                "ffmpeg conversion failed"
            );
            return Err(TranscodeError::ConversionFailed(stderr.trim().to_string()));
        }

        tracing::debug!(format = %config.format, output = %output.display(), "ffmpeg conversion finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::speech::OutputFormat;
    use std::path::PathBuf;

    #[test]
    fn test_build_args() {
        let config = TranscodeConfig::default().with_format(OutputFormat::parse("mp3").unwrap());
        let args = FfmpegTranscoder::build_args(
            &PathBuf::from("/tmp/in.wav"),
            &PathBuf::from("/tmp/out.mp3"),
            &config,
        );
        assert_eq!(
            args,
            vec![
                "-y", "-hide_banner", "-loglevel", "error", "-i", "/tmp/in.wav", "-ac", "1",
                "-ar", "24000", "-b:a", "64k", "/tmp/out.mp3",
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_failure() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder = FfmpegTranscoder::new(dir.path().join("no-ffmpeg").display().to_string());
        let err = transcoder
            .transcode(
                &dir.path().join("in.wav"),
                &dir.path().join("out.mp3"),
                &TranscodeConfig::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::SpawnFailed(_)));
    }
}
