//! Piper Gateway - HTTP 语音合成服务
//!
//! POST /v1/audio/speech，按需下载并加载 Piper 音色，可选 ffmpeg 转码

use clap::Parser;
use std::sync::Arc;

use piper_gateway::application::{SpeechSettings, SynthesizeSpeechHandler, VoiceCachePort};
use piper_gateway::config::{load_config_from_path, print_config, ApiArgs};
use piper_gateway::domain::voice::VoiceName;
use piper_gateway::infrastructure::adapters::{
    FfmpegTranscoder, HttpModelFetcher, HttpModelFetcherConfig, PiperEngine,
};
use piper_gateway::infrastructure::http::{AppState, HttpServer};
use piper_gateway::infrastructure::memory::InMemoryVoiceCache;
use piper_gateway::{init_tracing, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ApiArgs::parse();

    // 加载配置（优先级：命令行 > 环境变量 > 配置文件 > 默认值）
    let config = load_config_from_path(args.config.as_deref(), &args.overrides())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log.level);

    tracing::info!("Piper Gateway - HTTP speech API");
    print_config(&config);

    // 创建适配器
    let engine = Arc::new(PiperEngine::new(config.piper.engine_config()));
    let fetcher = Arc::new(HttpModelFetcher::new(HttpModelFetcherConfig::default())?);
    let voices = InMemoryVoiceCache::new(
        config.models.voice_cache_config(),
        fetcher,
        engine.clone(),
    )
    .arc();
    let transcoder = Arc::new(FfmpegTranscoder::new(config.transcoder.ffmpeg_path.clone()));

    // 预加载默认音色，失败则不启动
    let default_voice = VoiceName::parse(&config.models.default_voice)?;
    tracing::info!(voice = %default_voice, "Pre-loading default voice");
    voices.get_voice(default_voice.as_str()).await?;

    let settings = SpeechSettings {
        default_voice,
        apply_speed: config.synthesis.apply_speed,
        transcode: config.transcoder.transcode_config(),
    };
    let handler = SynthesizeSpeechHandler::new(voices.clone(), engine, transcoder, settings);

    let state = AppState::new(voices.clone(), handler);
    let server = HttpServer::new(config.server.addr(), state);

    // 启动服务器（带优雅关闭）
    server.run_with_shutdown(shutdown_signal()).await?;

    voices.clear();
    tracing::info!("Server shutdown complete");

    Ok(())
}
