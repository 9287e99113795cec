//! In-Memory Voice Cache Implementation
//!
//! identifier -> 已加载音色。每个 key 一个 OnceCell 槽位，
//! 并发首次访问只会触发一次 下载 + 加载

use async_trait::async_trait;
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::application::ports::{ModelFetcherPort, TtsEnginePort, VoiceCachePort};
use crate::domain::voice::{LoadedVoice, VoiceError, VoiceName};

/// Voice Cache 配置
#[derive(Debug, Clone)]
pub struct VoiceCacheConfig {
    /// 模型文件目录
    pub models_dir: PathBuf,
    /// 模型仓库基础 URL
    pub repository_url: String,
    /// 最多同时加载的音色数，0 表示不限制
    pub max_loaded_voices: usize,
}

impl Default for VoiceCacheConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from("./models"),
            repository_url: "https://huggingface.co/rhasspy/piper-voices/resolve/main".to_string(),
            max_loaded_voices: 0,
        }
    }
}

struct VoiceSlot {
    voice: OnceCell<Arc<LoadedVoice>>,
    last_used: AtomicU64,
}

impl VoiceSlot {
    fn new() -> Self {
        Self {
            voice: OnceCell::new(),
            last_used: AtomicU64::new(0),
        }
    }
}

/// 内存音色缓存
pub struct InMemoryVoiceCache {
    config: VoiceCacheConfig,
    fetcher: Arc<dyn ModelFetcherPort>,
    engine: Arc<dyn TtsEnginePort>,
    slots: DashMap<String, Arc<VoiceSlot>>,
    clock: AtomicU64,
}

impl InMemoryVoiceCache {
    pub fn new(
        config: VoiceCacheConfig,
        fetcher: Arc<dyn ModelFetcherPort>,
        engine: Arc<dyn TtsEnginePort>,
    ) -> Self {
        Self {
            config,
            fetcher,
            engine,
            slots: DashMap::new(),
            clock: AtomicU64::new(0),
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 下载缺失的模型文件并加载
    ///
    /// 本地文件存在即视为可用，不做完整性校验
    async fn load(&self, name: &VoiceName) -> Result<Arc<LoadedVoice>, VoiceError> {
        let files = name.model_files(&self.config.models_dir);
        let urls = name.model_urls(&self.config.repository_url);

        tokio::fs::create_dir_all(&self.config.models_dir)
            .await
            .map_err(|e| VoiceError::DownloadFailed(format!("models dir: {}", e)))?;

        for (url, path) in [(&urls.onnx, &files.onnx), (&urls.config, &files.config)] {
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                continue;
            }
            tracing::info!(voice = %name, url = %url, "Downloading model file");
            let bytes = self
                .fetcher
                .fetch(url, path)
                .await
                .map_err(|e| VoiceError::DownloadFailed(format!("{}: {}", url, e)))?;
            tracing::info!(voice = %name, path = %path.display(), bytes, "Model file downloaded");
        }

        tracing::info!(voice = %name, "Loading voice into memory");
        let voice = self
            .engine
            .load_voice(name, &files)
            .await
            .map_err(|e| VoiceError::LoadFailed(e.to_string()))?;

        Ok(Arc::new(voice))
    }

    fn evict_over_capacity(&self, keep: &str) {
        let max = self.config.max_loaded_voices;
        if max == 0 {
            return;
        }

        loop {
            let loaded: Vec<(String, u64)> = self
                .slots
                .iter()
                .filter(|e| e.value().voice.initialized())
                .map(|e| (e.key().clone(), e.value().last_used.load(Ordering::Relaxed)))
                .collect();
            if loaded.len() <= max {
                return;
            }

            let victim = loaded
                .into_iter()
                .filter(|(key, _)| key != keep)
                .min_by_key(|(_, last_used)| *last_used)
                .map(|(key, _)| key);

            match victim {
                Some(key) => {
                    self.slots.remove(&key);
                    tracing::info!(voice = %key, "Evicted least recently used voice");
                }
                None => return,
            }
        }
    }
}

#[async_trait]
impl VoiceCachePort for InMemoryVoiceCache {
    async fn get_voice(&self, name: &str) -> Result<Arc<LoadedVoice>, VoiceError> {
        let name = VoiceName::parse(name)?;

        // 先拿到槽位的 Arc，再在分片锁之外 await
        let slot = self
            .slots
            .entry(name.as_str().to_string())
            .or_insert_with(|| Arc::new(VoiceSlot::new()))
            .value()
            .clone();
        slot.last_used
            .store(self.clock.fetch_add(1, Ordering::Relaxed), Ordering::Relaxed);

        let result = slot
            .voice
            .get_or_try_init(|| self.load(&name))
            .await
            .cloned();

        match result {
            Ok(voice) => {
                self.evict_over_capacity(name.as_str());
                Ok(voice)
            }
            Err(e) => {
                // 失败的空槽位不保留，下次请求重新尝试
                self.slots.remove_if(name.as_str(), |_, s| {
                    Arc::ptr_eq(s, &slot) && !s.voice.initialized()
                });
                tracing::error!(voice = %name, error = %e, "Failed to load voice");
                Err(e)
            }
        }
    }

    fn loaded_voices(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .slots
            .iter()
            .filter(|e| e.value().voice.initialized())
            .map(|e| e.key().clone())
            .collect();
        names.sort();
        names
    }

    fn clear(&self) {
        let count = self.slots.len();
        self.slots.clear();
        tracing::info!(count, "Released all loaded voices");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{voice_fixture, voice_fixture_with_capacity};

    #[tokio::test]
    async fn test_first_access_downloads_and_loads_once() {
        let fixture = voice_fixture().await;

        let first = fixture.cache.get_voice("de_DE-thorsten-high").await.unwrap();
        let second = fixture.cache.get_voice(" de_DE-thorsten-high ").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fixture.engine.load_count(), 1);
        assert_eq!(
            fixture.fetcher.urls(),
            vec![
                "http://models.test/de/de_DE/thorsten/high/de_DE-thorsten-high.onnx".to_string(),
                "http://models.test/de/de_DE/thorsten/high/de_DE-thorsten-high.onnx.json"
                    .to_string(),
            ]
        );
        assert!(fixture.models_dir().join("de_DE-thorsten-high.onnx").exists());
        assert!(fixture.models_dir().join("de_DE-thorsten-high.onnx.json").exists());
    }

    #[tokio::test]
    async fn test_concurrent_first_access_is_single_flight() {
        let fixture = voice_fixture().await;

        let (a, b, c) = tokio::join!(
            fixture.cache.get_voice("en_US-lessac-medium"),
            fixture.cache.get_voice("en_US-lessac-medium"),
            fixture.cache.get_voice("en_US-lessac-medium"),
        );

        let a = a.unwrap();
        assert!(Arc::ptr_eq(&a, &b.unwrap()));
        assert!(Arc::ptr_eq(&a, &c.unwrap()));
        assert_eq!(fixture.engine.load_count(), 1);
        assert_eq!(fixture.fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_existing_files_are_not_downloaded() {
        let fixture = voice_fixture().await;
        let dir = fixture.models_dir();
        std::fs::write(dir.join("en_US-lessac-medium.onnx"), b"onnx").unwrap();
        std::fs::write(dir.join("en_US-lessac-medium.onnx.json"), b"{}").unwrap();

        fixture.cache.get_voice("en_US-lessac-medium").await.unwrap();
        assert_eq!(fixture.fetcher.calls(), 0);
        assert_eq!(fixture.engine.load_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_name_fails_before_network() {
        let fixture = voice_fixture().await;

        let err = fixture.cache.get_voice("de_DE-thorsten").await.unwrap_err();
        assert!(matches!(err, VoiceError::InvalidName(_)));
        assert_eq!(fixture.fetcher.calls(), 0);
        assert!(fixture.cache.loaded_voices().is_empty());
    }

    #[tokio::test]
    async fn test_download_failure_can_be_retried() {
        let fixture = voice_fixture().await;
        fixture.fetcher.fail(true);

        let err = fixture.cache.get_voice("de_DE-thorsten-high").await.unwrap_err();
        assert!(matches!(err, VoiceError::DownloadFailed(_)));
        assert!(fixture.cache.loaded_voices().is_empty());
        assert_eq!(fixture.engine.load_count(), 0);

        fixture.fetcher.fail(false);
        fixture.cache.get_voice("de_DE-thorsten-high").await.unwrap();
        assert_eq!(fixture.cache.loaded_voices(), vec!["de_DE-thorsten-high"]);
    }

    #[tokio::test]
    async fn test_load_failure_is_reported() {
        let fixture = voice_fixture().await;
        fixture.engine.fail_loading(true);

        let err = fixture.cache.get_voice("de_DE-thorsten-high").await.unwrap_err();
        assert!(matches!(err, VoiceError::LoadFailed(_)));
    }

    #[tokio::test]
    async fn test_lru_eviction_when_capacity_set() {
        let fixture = voice_fixture_with_capacity(1).await;

        fixture.cache.get_voice("de_DE-thorsten-high").await.unwrap();
        fixture.cache.get_voice("en_US-lessac-medium").await.unwrap();
        assert_eq!(fixture.cache.loaded_voices(), vec!["en_US-lessac-medium"]);

        // 被淘汰的音色再次请求时重新加载（文件已在本地，不再下载）
        let downloads = fixture.fetcher.calls();
        fixture.cache.get_voice("de_DE-thorsten-high").await.unwrap();
        assert_eq!(fixture.engine.load_count(), 3);
        assert_eq!(fixture.fetcher.calls(), downloads);
        assert_eq!(fixture.cache.loaded_voices(), vec!["de_DE-thorsten-high"]);
    }

    #[tokio::test]
    async fn test_unbounded_by_default() {
        let fixture = voice_fixture().await;

        fixture.cache.get_voice("de_DE-thorsten-high").await.unwrap();
        fixture.cache.get_voice("en_US-lessac-medium").await.unwrap();
        fixture.cache.get_voice("en_GB-alan-low").await.unwrap();
        assert_eq!(fixture.cache.loaded_voices().len(), 3);
    }

    #[tokio::test]
    async fn test_clear_releases_everything() {
        let fixture = voice_fixture().await;
        fixture.cache.get_voice("de_DE-thorsten-high").await.unwrap();

        fixture.cache.clear();
        assert!(fixture.cache.loaded_voices().is_empty());

        fixture.cache.get_voice("de_DE-thorsten-high").await.unwrap();
        assert_eq!(fixture.engine.load_count(), 2);
    }
}
