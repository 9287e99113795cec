//! 测试公共夹具
//!
//! 组装一个使用 FakeTtsEngine + 本地假下载器的音色缓存，
//! 以及一个可注入失败的转码器

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use crate::application::ports::{
    AudioTranscoderPort, FetchError, ModelFetcherPort, TranscodeConfig, TranscodeError,
};
use crate::domain::voice::VoiceName;
use crate::infrastructure::adapters::FakeTtsEngine;
use crate::infrastructure::memory::{InMemoryVoiceCache, VoiceCacheConfig};

pub const DEFAULT_VOICE: &str = "de_DE-thorsten-high";

/// 假下载器：稍作等待后写入固定内容
#[derive(Default)]
pub struct CountingFetcher {
    urls: Mutex<Vec<String>>,
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl CountingFetcher {
    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ModelFetcherPort for CountingFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());

        // 让并发请求有机会重叠
        tokio::time::sleep(Duration::from_millis(20)).await;

        if self.fail.load(Ordering::SeqCst) {
            return Err(FetchError::HttpStatus {
                status: 503,
                url: url.to_string(),
            });
        }

        let body = b"fake model bytes";
        tokio::fs::write(dest, body)
            .await
            .map_err(|e| FetchError::IoError(e.to_string()))?;
        Ok(body.len() as u64)
    }
}

/// 假转码器：成功时把输入原样复制到输出
pub struct FakeTranscoder {
    succeed: bool,
    calls: Mutex<Vec<TranscodeConfig>>,
    outputs: Mutex<Vec<PathBuf>>,
}

impl FakeTranscoder {
    pub fn succeeding() -> Self {
        Self {
            succeed: true,
            calls: Mutex::new(Vec::new()),
            outputs: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            succeed: false,
            ..Self::succeeding()
        }
    }

    pub fn calls(&self) -> Vec<TranscodeConfig> {
        self.calls.lock().unwrap().clone()
    }

    pub fn outputs(&self) -> Vec<PathBuf> {
        self.outputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioTranscoderPort for FakeTranscoder {
    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        config: &TranscodeConfig,
    ) -> Result<(), TranscodeError> {
        self.calls.lock().unwrap().push(config.clone());
        self.outputs.lock().unwrap().push(output.to_path_buf());

        if !self.succeed {
            return Err(TranscodeError::ConversionFailed(
                "Invalid data found when processing input".to_string(),
            ));
        }

        tokio::fs::copy(input, output)
            .await
            .map_err(|e| TranscodeError::ConversionFailed(e.to_string()))?;
        Ok(())
    }
}

/// 音色缓存夹具，模型目录随夹具一起删除
pub struct VoiceFixture {
    pub cache: Arc<InMemoryVoiceCache>,
    pub engine: Arc<FakeTtsEngine>,
    pub fetcher: Arc<CountingFetcher>,
    dir: TempDir,
}

impl VoiceFixture {
    pub fn default_voice(&self) -> VoiceName {
        VoiceName::parse(DEFAULT_VOICE).unwrap()
    }

    pub fn models_dir(&self) -> PathBuf {
        self.dir.path().join("models")
    }
}

pub async fn voice_fixture() -> VoiceFixture {
    voice_fixture_with_capacity(0).await
}

pub async fn voice_fixture_with_capacity(max_loaded_voices: usize) -> VoiceFixture {
    let dir = tempfile::tempdir().unwrap();
    let models_dir = dir.path().join("models");
    tokio::fs::create_dir_all(&models_dir).await.unwrap();

    let engine = Arc::new(FakeTtsEngine::default());
    let fetcher = Arc::new(CountingFetcher::default());
    let cache = InMemoryVoiceCache::new(
        VoiceCacheConfig {
            models_dir,
            repository_url: "http://models.test".to_string(),
            max_loaded_voices,
        },
        fetcher.clone(),
        engine.clone(),
    )
    .arc();

    VoiceFixture {
        cache,
        engine,
        fetcher,
        dir,
    }
}
