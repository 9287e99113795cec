//! Fake TTS Engine - 用于测试的 TTS 引擎
//!
//! 不调用 piper，写出固定长度的静音 WAV，并记录调用情况

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::wav::encode_pcm16_wav;
use crate::application::ports::{AudioInfo, SynthesisOptions, TtsEnginePort, TtsError};
use crate::domain::voice::{LoadedVoice, ModelFiles, VoiceName};

/// Fake TTS Engine 配置
#[derive(Debug, Clone)]
pub struct FakeTtsEngineConfig {
    /// 输出音频时长（毫秒）
    pub duration_ms: u64,
    /// 采样率
    pub sample_rate: u32,
}

impl Default for FakeTtsEngineConfig {
    fn default() -> Self {
        Self {
            duration_ms: 200,
            sample_rate: 22050,
        }
    }
}

/// Fake TTS Engine
#[derive(Default)]
pub struct FakeTtsEngine {
    config: FakeTtsEngineConfig,
    load_count: AtomicUsize,
    synth_count: AtomicUsize,
    fail_loading: AtomicBool,
    fail_synthesis: AtomicBool,
    outputs: Mutex<Vec<PathBuf>>,
    last_options: Mutex<Option<SynthesisOptions>>,
}

impl FakeTtsEngine {
    pub fn new(config: FakeTtsEngineConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }

    /// 成功完成的合成次数
    pub fn synth_count(&self) -> usize {
        self.synth_count.load(Ordering::SeqCst)
    }

    pub fn fail_loading(&self, fail: bool) {
        self.fail_loading.store(fail, Ordering::SeqCst);
    }

    pub fn fail_synthesis(&self, fail: bool) {
        self.fail_synthesis.store(fail, Ordering::SeqCst);
    }

    /// 所有被要求写入的输出路径（含失败的调用）
    pub fn outputs(&self) -> Vec<PathBuf> {
        self.outputs.lock().map(|o| o.clone()).unwrap_or_default()
    }

    pub fn last_options(&self) -> Option<SynthesisOptions> {
        self.last_options.lock().ok().and_then(|o| *o)
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsEngine {
    async fn load_voice(
        &self,
        name: &VoiceName,
        files: &ModelFiles,
    ) -> Result<LoadedVoice, TtsError> {
        if self.fail_loading.load(Ordering::SeqCst) {
            return Err(TtsError::InvalidConfig("injected load failure".to_string()));
        }
        if !files.both_exist() {
            return Err(TtsError::ModelMissing(name.to_string()));
        }
        self.load_count.fetch_add(1, Ordering::SeqCst);
        Ok(LoadedVoice::new(
            name.clone(),
            files.clone(),
            self.config.sample_rate,
        ))
    }

    async fn synthesize(
        &self,
        voice: &LoadedVoice,
        text: &str,
        output: &Path,
        options: SynthesisOptions,
    ) -> Result<AudioInfo, TtsError> {
        if let Ok(mut outputs) = self.outputs.lock() {
            outputs.push(output.to_path_buf());
        }
        if let Ok(mut last) = self.last_options.lock() {
            *last = Some(options);
        }

        if self.fail_synthesis.load(Ordering::SeqCst) {
            return Err(TtsError::ProcessError("injected synthesis failure".to_string()));
        }

        tracing::debug!(
            voice = %voice.name(),
            text_len = text.len(),
            "FakeTtsEngine: writing silent audio"
        );

        let frames = (self.config.sample_rate as u64 * self.config.duration_ms / 1000) as usize;
        let wav = encode_pcm16_wav(&vec![0i16; frames], self.config.sample_rate, 1);
        tokio::fs::write(output, wav)
            .await
            .map_err(|e| TtsError::IoError(e.to_string()))?;

        self.synth_count.fetch_add(1, Ordering::SeqCst);
        Ok(AudioInfo {
            duration_ms: self.config.duration_ms,
            sample_rate: self.config.sample_rate,
            channels: 1,
        })
    }
}
