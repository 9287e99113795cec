//! Piper Gateway - Piper 语音合成服务
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Voice Context: 音色标识、模型文件定位
//! - Speech Context: 合成文本、输出格式、缓存 key
//!
//! 应用层 (application/):
//! - Ports: TtsEngine, VoiceCache, ModelFetcher, AudioTranscoder, ObjectStore, ActionPublisher
//! - Commands: 同步合成 / 合成并上传
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: OpenAI 兼容的 /v1/audio/speech
//! - MQTT: 订阅合成请求，下发 play_audio 动作
//! - Worker: SynthesisWorker 有界队列 + 并发控制
//! - Memory: 音色缓存
//! - Adapters: piper, ffmpeg, 模型下载, S3

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::AppConfig;

/// 初始化日志，`RUST_LOG` 优先
pub fn init_tracing(level: &str) {
    let log_filter = format!("{},piper_gateway={},tower_http=debug", level, level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .init();
}

/// 等待 Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}
