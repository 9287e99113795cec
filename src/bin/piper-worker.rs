//! Piper Worker - MQTT 驱动的合成 Worker
//!
//! 订阅 `voice/tts/generate`，以 S3 作为内容寻址缓存，
//! 合成完成后向 `satellite/{room}/action` 下发 play_audio

use clap::Parser;
use std::sync::Arc;

use piper_gateway::application::{SynthesizeAndUploadHandler, VoiceCachePort};
use piper_gateway::config::{
    load_config_from_path, print_worker_config, validate_worker_config, WorkerArgs,
};
use piper_gateway::domain::voice::VoiceName;
use piper_gateway::infrastructure::adapters::{
    HttpModelFetcher, HttpModelFetcherConfig, PiperEngine, S3ObjectStore,
};
use piper_gateway::infrastructure::memory::InMemoryVoiceCache;
use piper_gateway::infrastructure::mqtt::{mqtt_client, MqttActionPublisher, MqttListener};
use piper_gateway::infrastructure::worker::{job_queue, SynthesisWorker};
use piper_gateway::{init_tracing, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = WorkerArgs::parse();

    let config = load_config_from_path(args.config.as_deref(), &args.overrides())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
    validate_worker_config(&config)?;

    init_tracing(&config.log.level);

    tracing::info!("Piper Worker - MQTT synthesis worker");
    print_worker_config(&config);

    // 创建适配器
    let engine = Arc::new(PiperEngine::new(config.piper.engine_config()));
    let fetcher = Arc::new(HttpModelFetcher::new(HttpModelFetcherConfig::default())?);
    let voices = InMemoryVoiceCache::new(
        config.models.voice_cache_config(),
        fetcher,
        engine.clone(),
    )
    .arc();
    let store = Arc::new(S3ObjectStore::new(&config.storage.s3_config()));

    // 预加载默认音色
    let default_voice = VoiceName::parse(&config.models.default_voice)?;
    tracing::info!(voice = %default_voice, "Pre-loading default voice");
    voices.get_voice(default_voice.as_str()).await?;

    let handler = SynthesizeAndUploadHandler::new(voices.clone(), engine, store, default_voice)
        .with_fail_open(config.storage.fail_open_on_probe_error);

    // MQTT
    let (client, eventloop) = mqtt_client(&config.mqtt.client_config());
    let publisher = Arc::new(MqttActionPublisher::new(
        client.clone(),
        config.mqtt.action_topic.clone(),
    ));

    // 有界队列 + SynthesisWorker
    let worker_config = config.worker.worker_config();
    let (jobs, job_rx) = job_queue(worker_config.queue_capacity);
    let worker = SynthesisWorker::new(worker_config, job_rx, Arc::new(handler), publisher);
    let worker_handle = tokio::spawn(worker.run());

    tracing::info!(
        host = %config.mqtt.host,
        port = config.mqtt.port,
        "Connecting to MQTT broker"
    );
    let listener = MqttListener::new(config.mqtt.request_topic.clone(), jobs);
    let result = listener.run(client, eventloop, shutdown_signal()).await;

    // listener 已 drop，队列关闭后 Worker 处理完剩余任务退出
    tracing::info!("Shutting down TTS worker...");
    if let Err(e) = worker_handle.await {
        tracing::error!(error = %e, "Worker task failed");
    }

    voices.clear();

    result.map_err(|e| anyhow::anyhow!("MQTT error: {}", e))
}
