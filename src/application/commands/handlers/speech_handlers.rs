//! Speech Command Handlers
//!
//! - SynthesizeSpeechHandler: HTTP 同步合成（可选转码）
//! - SynthesizeAndUploadHandler: Worker 合成，带对象存储内容寻址缓存

use std::sync::Arc;
use tempfile::TempPath;

use crate::application::commands::speech_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioTranscoderPort, ObjectStorePort, SynthesisOptions, TranscodeConfig, TtsEnginePort,
    VoiceCachePort,
};
use crate::domain::speech::{CacheKey, OutputFormat, SpeechText};
use crate::domain::voice::VoiceName;

/// 创建带后缀的临时文件，返回 drop 即删除的路径
fn temp_audio_path(extension: &str) -> Result<TempPath, ApplicationError> {
    let file = tempfile::Builder::new()
        .prefix("piper-")
        .suffix(&format!(".{}", extension))
        .tempfile()?;
    Ok(file.into_temp_path())
}

// ============================================================================
// SynthesizeSpeech
// ============================================================================

/// HTTP 合成设置
#[derive(Debug, Clone)]
pub struct SpeechSettings {
    pub default_voice: VoiceName,
    /// 是否把请求里的 speed 传给引擎（默认关闭，speed 只被接受不生效）
    pub apply_speed: bool,
    /// 非 wav 格式的转码参数（format 字段按请求覆盖）
    pub transcode: TranscodeConfig,
}

impl SpeechSettings {
    pub fn new(default_voice: VoiceName) -> Self {
        Self {
            default_voice,
            apply_speed: false,
            transcode: TranscodeConfig::default(),
        }
    }
}

/// SynthesizeSpeech Handler
pub struct SynthesizeSpeechHandler {
    voices: Arc<dyn VoiceCachePort>,
    engine: Arc<dyn TtsEnginePort>,
    transcoder: Arc<dyn AudioTranscoderPort>,
    settings: SpeechSettings,
}

impl SynthesizeSpeechHandler {
    pub fn new(
        voices: Arc<dyn VoiceCachePort>,
        engine: Arc<dyn TtsEnginePort>,
        transcoder: Arc<dyn AudioTranscoderPort>,
        settings: SpeechSettings,
    ) -> Self {
        Self {
            voices,
            engine,
            transcoder,
            settings,
        }
    }

    pub fn default_voice(&self) -> &VoiceName {
        &self.settings.default_voice
    }

    fn synthesis_options(&self, speed: f32) -> Result<SynthesisOptions, ApplicationError> {
        if !self.settings.apply_speed {
            if (speed - 1.0).abs() > f32::EPSILON {
                tracing::debug!(speed, "Speed accepted but not applied");
            }
            return Ok(SynthesisOptions::default());
        }

        if !speed.is_finite() || speed <= 0.0 {
            return Err(ApplicationError::validation(format!(
                "Speed must be a positive number, got {}",
                speed
            )));
        }

        Ok(SynthesisOptions {
            length_scale: Some(1.0 / speed),
        })
    }

    pub async fn handle(&self, cmd: SynthesizeSpeech) -> Result<SpeechAudio, ApplicationError> {
        let text = SpeechText::new(cmd.text)?;
        let format = OutputFormat::parse(&cmd.response_format)?;
        let options = self.synthesis_options(cmd.speed)?;

        let voice_name = cmd
            .voice
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(self.settings.default_voice.as_str());
        let voice = self.voices.get_voice(voice_name).await?;

        // 出错时 TempPath drop 会删除文件
        let wav = temp_audio_path("wav")?;
        let info = self
            .engine
            .synthesize(&voice, text.as_str(), &wav, options)
            .await?;

        tracing::info!(
            voice = %voice.name(),
            format = %format,
            duration_ms = info.duration_ms,
            text = %text.preview(),
            "Speech synthesized"
        );

        if format.is_wav() {
            return Ok(SpeechAudio::new(wav, format.content_type()));
        }

        let converted = temp_audio_path(format.extension())?;
        let config = self.settings.transcode.clone().with_format(format.clone());
        self.transcoder.transcode(&wav, &converted, &config).await?;

        Ok(SpeechAudio::new(converted, format.content_type()).with_scratch(wav))
    }
}

// ============================================================================
// SynthesizeAndUpload
// ============================================================================

/// SynthesizeAndUpload Handler
///
/// 流程：计算 key -> 探测对象存储 -> (未命中) 合成 -> 上传
pub struct SynthesizeAndUploadHandler {
    voices: Arc<dyn VoiceCachePort>,
    engine: Arc<dyn TtsEnginePort>,
    store: Arc<dyn ObjectStorePort>,
    default_voice: VoiceName,
    /// 探测出错（非 404）时是否继续合成
    fail_open_on_probe_error: bool,
}

impl SynthesizeAndUploadHandler {
    pub fn new(
        voices: Arc<dyn VoiceCachePort>,
        engine: Arc<dyn TtsEnginePort>,
        store: Arc<dyn ObjectStorePort>,
        default_voice: VoiceName,
    ) -> Self {
        Self {
            voices,
            engine,
            store,
            default_voice,
            fail_open_on_probe_error: true,
        }
    }

    pub fn with_fail_open(mut self, fail_open: bool) -> Self {
        self.fail_open_on_probe_error = fail_open;
        self
    }

    pub fn cache_key(&self, text: &SpeechText) -> CacheKey {
        CacheKey::for_speech(&self.default_voice, text)
    }

    pub async fn handle(&self, cmd: SynthesizeAndUpload) -> Result<CacheKey, ApplicationError> {
        let text = SpeechText::new(cmd.text)?;
        let key = self.cache_key(&text);

        match self.store.exists(key.as_str()).await {
            Ok(true) => {
                tracing::info!(key = %key, text = %text.preview(), "Cache hit, skipping synthesis");
                return Ok(key);
            }
            Ok(false) => {}
            Err(e) if self.fail_open_on_probe_error => {
                tracing::error!(key = %key, error = %e, "Cache probe failed, synthesizing anyway");
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(key = %key, text = %text.preview(), "Synthesizing new audio");
        let voice = self.voices.get_voice(self.default_voice.as_str()).await?;

        let wav = temp_audio_path("wav")?;
        let info = self
            .engine
            .synthesize(&voice, text.as_str(), &wav, SynthesisOptions::default())
            .await?;

        self.store.put_file(key.as_str(), &wav, "audio/wav").await?;

        tracing::info!(
            key = %key,
            duration_ms = info.duration_ms,
            "Audio uploaded"
        );

        if let Err(e) = wav.close() {
            tracing::warn!(error = %e, "Failed to remove temporary wav");
        }

        Ok(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::StorageError;
    use crate::infrastructure::memory::InMemoryObjectStore;
    use crate::test_support::{voice_fixture, FakeTranscoder};

    fn speech(text: &str, format: &str) -> SynthesizeSpeech {
        SynthesizeSpeech {
            text: text.to_string(),
            voice: None,
            response_format: format.to_string(),
            speed: 1.0,
        }
    }

    fn speech_handler(
        fixture: &crate::test_support::VoiceFixture,
        transcoder: Arc<FakeTranscoder>,
    ) -> SynthesizeSpeechHandler {
        SynthesizeSpeechHandler::new(
            fixture.cache.clone(),
            fixture.engine.clone(),
            transcoder,
            SpeechSettings::new(fixture.default_voice()),
        )
    }

    #[tokio::test]
    async fn test_wav_returns_engine_output() {
        let fixture = voice_fixture().await;
        let handler = speech_handler(&fixture, Arc::new(FakeTranscoder::succeeding()));

        let audio = handler.handle(speech("Guten Tag", "wav")).await.unwrap();
        assert_eq!(audio.content_type(), "audio/wav");
        assert_eq!(audio.temp_paths().len(), 1);
        assert!(std::fs::metadata(audio.path()).unwrap().len() > 44);

        let path = audio.path().to_path_buf();
        drop(audio);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_mp3_is_transcoded() {
        let fixture = voice_fixture().await;
        let transcoder = Arc::new(FakeTranscoder::succeeding());
        let handler = speech_handler(&fixture, transcoder.clone());

        let audio = handler.handle(speech("Guten Tag", "mp3")).await.unwrap();
        assert_eq!(audio.content_type(), "audio/mpeg");
        assert_eq!(audio.temp_paths().len(), 2);
        assert!(audio.path().to_string_lossy().ends_with(".mp3"));

        let configs = transcoder.calls();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].format.extension(), "mp3");
        assert_eq!(configs[0].sample_rate, 24000);
        assert_eq!(configs[0].bitrate, "64k");
        assert_eq!(configs[0].channels, 1);

        let paths: Vec<_> = audio.temp_paths().iter().map(|p| p.to_path_buf()).collect();
        drop(audio);
        assert!(paths.iter().all(|p| !p.exists()));
    }

    #[tokio::test]
    async fn test_other_format_content_type() {
        let fixture = voice_fixture().await;
        let handler = speech_handler(&fixture, Arc::new(FakeTranscoder::succeeding()));

        let audio = handler.handle(speech("Guten Tag", "opus")).await.unwrap();
        assert_eq!(audio.content_type(), "audio/opus");
    }

    #[tokio::test]
    async fn test_blank_text_rejected_before_synthesis() {
        let fixture = voice_fixture().await;
        let handler = speech_handler(&fixture, Arc::new(FakeTranscoder::succeeding()));

        let err = handler.handle(speech("   ", "wav")).await.unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
        assert_eq!(fixture.engine.synth_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_voice_is_validation_error() {
        let fixture = voice_fixture().await;
        let handler = speech_handler(&fixture, Arc::new(FakeTranscoder::succeeding()));

        let mut cmd = speech("Hallo", "wav");
        cmd.voice = Some("thorsten".to_string());
        let err = handler.handle(cmd).await.unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
        assert_eq!(fixture.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_conversion_failure_cleans_up() {
        let fixture = voice_fixture().await;
        let transcoder = Arc::new(FakeTranscoder::failing());
        let handler = speech_handler(&fixture, transcoder.clone());

        let err = handler.handle(speech("Hallo", "mp3")).await.unwrap_err();
        assert!(matches!(err, ApplicationError::ConversionError(_)));

        let written = fixture.engine.outputs();
        assert_eq!(written.len(), 1);
        assert!(!written[0].exists());
        assert!(transcoder.outputs().iter().all(|p| !p.exists()));
    }

    #[tokio::test]
    async fn test_engine_failure_is_internal_and_cleans_up() {
        let fixture = voice_fixture().await;
        fixture.engine.fail_synthesis(true);
        let handler = speech_handler(&fixture, Arc::new(FakeTranscoder::succeeding()));

        let err = handler.handle(speech("Hallo", "wav")).await.unwrap_err();
        assert!(matches!(err, ApplicationError::InternalError(_)));
        assert!(fixture.engine.outputs().iter().all(|p| !p.exists()));
    }

    #[tokio::test]
    async fn test_speed_ignored_unless_enabled() {
        let fixture = voice_fixture().await;
        let mut handler = speech_handler(&fixture, Arc::new(FakeTranscoder::succeeding()));

        let mut cmd = speech("Hallo", "wav");
        cmd.speed = 2.0;
        handler.handle(cmd.clone()).await.unwrap();
        assert_eq!(fixture.engine.last_options().unwrap().length_scale, None);

        handler.settings.apply_speed = true;
        handler.handle(cmd.clone()).await.unwrap();
        assert_eq!(fixture.engine.last_options().unwrap().length_scale, Some(0.5));

        cmd.speed = 0.0;
        assert!(matches!(
            handler.handle(cmd).await.unwrap_err(),
            ApplicationError::ValidationError(_)
        ));
    }

    fn upload_handler(
        fixture: &crate::test_support::VoiceFixture,
        store: Arc<InMemoryObjectStore>,
    ) -> SynthesizeAndUploadHandler {
        SynthesizeAndUploadHandler::new(
            fixture.cache.clone(),
            fixture.engine.clone(),
            store,
            fixture.default_voice(),
        )
    }

    fn upload(text: &str) -> SynthesizeAndUpload {
        SynthesizeAndUpload {
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_cache_miss_synthesizes_and_uploads() {
        let fixture = voice_fixture().await;
        let store = Arc::new(InMemoryObjectStore::new());
        let handler = upload_handler(&fixture, store.clone());

        let key = handler.handle(upload("Hallo")).await.unwrap();
        assert_eq!(key.as_str(), "tts_7cc3898d2325af6b4eaf55ce838568bd.wav");
        assert_eq!(fixture.engine.synth_count(), 1);

        let object = store.get(key.as_str()).unwrap();
        assert_eq!(object.content_type, "audio/wav");
        assert!(object.data.starts_with(b"RIFF"));
        assert!(fixture.engine.outputs().iter().all(|p| !p.exists()));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_synthesis() {
        let fixture = voice_fixture().await;
        let store = Arc::new(InMemoryObjectStore::new());
        store.insert(
            "tts_7cc3898d2325af6b4eaf55ce838568bd.wav",
            b"cached".to_vec(),
            "audio/wav",
        );
        let handler = upload_handler(&fixture, store.clone());

        let key = handler.handle(upload("Hallo")).await.unwrap();
        assert_eq!(key.as_str(), "tts_7cc3898d2325af6b4eaf55ce838568bd.wav");
        assert_eq!(fixture.engine.synth_count(), 0);
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_still_removes_temp_file() {
        let fixture = voice_fixture().await;
        let store = Arc::new(InMemoryObjectStore::new());
        store.fail_uploads(true);
        let handler = upload_handler(&fixture, store.clone());

        let err = handler.handle(upload("Hallo")).await.unwrap_err();
        assert!(matches!(err, ApplicationError::StorageError(_)));
        let written = fixture.engine.outputs();
        assert_eq!(written.len(), 1);
        assert!(!written[0].exists());
    }

    #[tokio::test]
    async fn test_probe_error_fails_open_by_default() {
        let fixture = voice_fixture().await;
        let store = Arc::new(InMemoryObjectStore::new());
        store.fail_probes(true);
        let handler = upload_handler(&fixture, store.clone());

        handler.handle(upload("Hallo")).await.unwrap();
        assert_eq!(fixture.engine.synth_count(), 1);
        assert_eq!(store.put_count(), 1);
    }

    #[tokio::test]
    async fn test_probe_error_fails_closed_when_configured() {
        let fixture = voice_fixture().await;
        let store = Arc::new(InMemoryObjectStore::new());
        store.fail_probes(true);
        let handler = upload_handler(&fixture, store.clone()).with_fail_open(false);

        let err = handler.handle(upload("Hallo")).await.unwrap_err();
        assert!(matches!(err, ApplicationError::StorageError(_)));
        assert_eq!(fixture.engine.synth_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_text_rejected_for_upload() {
        let fixture = voice_fixture().await;
        let store = Arc::new(InMemoryObjectStore::new());
        let handler = upload_handler(&fixture, store.clone());

        let err = handler.handle(upload(" ")).await.unwrap_err();
        assert!(matches!(err, ApplicationError::ValidationError(_)));
        assert_eq!(store.probe_count(), 0);
    }

    #[test]
    fn test_storage_error_maps_to_storage() {
        let err: ApplicationError = StorageError::UploadFailed("boom".into()).into();
        assert!(matches!(err, ApplicationError::StorageError(_)));
    }
}
