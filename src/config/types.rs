//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::application::TranscodeConfig;
use crate::infrastructure::adapters::{PiperEngineConfig, S3StoreConfig};
use crate::infrastructure::memory::VoiceCacheConfig;
use crate::infrastructure::mqtt::MqttClientConfig;
use crate::infrastructure::worker::SynthesisWorkerConfig;

/// 应用主配置（HTTP 服务与 Worker 共用）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub models: ModelsConfig,

    #[serde(default)]
    pub piper: PiperConfig,

    #[serde(default)]
    pub synthesis: SynthesisConfig,

    #[serde(default)]
    pub transcoder: TranscoderConfig,

    #[serde(default)]
    pub mqtt: MqttConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub worker: WorkerConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 音色模型配置
#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    /// 模型文件目录
    #[serde(default = "default_models_dir")]
    pub dir: PathBuf,

    /// 默认音色，启动时预加载
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// 模型仓库基础 URL
    #[serde(default = "default_repository_url")]
    pub repository_url: String,

    /// 最多同时加载的音色数，0 表示不限制
    #[serde(default)]
    pub max_loaded_voices: usize,
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("./models")
}

fn default_voice() -> String {
    "de_DE-thorsten-high".to_string()
}

fn default_repository_url() -> String {
    "https://huggingface.co/rhasspy/piper-voices/resolve/main".to_string()
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: default_models_dir(),
            default_voice: default_voice(),
            repository_url: default_repository_url(),
            max_loaded_voices: 0,
        }
    }
}

impl ModelsConfig {
    pub fn voice_cache_config(&self) -> VoiceCacheConfig {
        VoiceCacheConfig {
            models_dir: self.dir.clone(),
            repository_url: self.repository_url.clone(),
            max_loaded_voices: self.max_loaded_voices,
        }
    }
}

/// Piper 可执行文件配置
#[derive(Debug, Clone, Deserialize)]
pub struct PiperConfig {
    #[serde(default = "default_piper_binary")]
    pub binary: String,
}

fn default_piper_binary() -> String {
    "piper".to_string()
}

impl Default for PiperConfig {
    fn default() -> Self {
        Self {
            binary: default_piper_binary(),
        }
    }
}

impl PiperConfig {
    pub fn engine_config(&self) -> PiperEngineConfig {
        PiperEngineConfig {
            binary: self.binary.clone(),
        }
    }
}

/// 合成参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SynthesisConfig {
    /// 是否把请求中的 speed 传给 piper（length_scale = 1 / speed）
    #[serde(default)]
    pub apply_speed: bool,
}

/// 转码配置
#[derive(Debug, Clone, Deserialize)]
pub struct TranscoderConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// 目标采样率（Hz）
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// 目标比特率，ffmpeg 写法
    #[serde(default = "default_bitrate")]
    pub bitrate: String,

    /// 声道数
    #[serde(default = "default_channels")]
    pub channels: u8,
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_sample_rate() -> u32 {
    24000
}

fn default_bitrate() -> String {
    "64k".to_string()
}

fn default_channels() -> u8 {
    1 // 单声道
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            sample_rate: default_sample_rate(),
            bitrate: default_bitrate(),
            channels: default_channels(),
        }
    }
}

impl TranscoderConfig {
    /// 转码参数（格式按请求覆盖）
    pub fn transcode_config(&self) -> TranscodeConfig {
        TranscodeConfig {
            sample_rate: self.sample_rate,
            bitrate: self.bitrate.clone(),
            channels: self.channels,
            ..TranscodeConfig::default()
        }
    }
}

/// MQTT 配置
#[derive(Debug, Clone, Deserialize)]
pub struct MqttConfig {
    #[serde(default = "default_mqtt_host")]
    pub host: String,

    #[serde(default = "default_mqtt_port")]
    pub port: u16,

    /// 为空时自动生成
    #[serde(default)]
    pub client_id: String,

    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,

    /// 单个 MQTT 包的最大字节数（收发共用）
    #[serde(default = "default_max_packet_size")]
    pub max_packet_size: usize,

    /// 合成请求 topic
    #[serde(default = "default_request_topic")]
    pub request_topic: String,

    /// 动作下发 topic 模板，`{room}` 会被替换
    #[serde(default = "default_action_topic")]
    pub action_topic: String,
}

fn default_mqtt_host() -> String {
    "localhost".to_string()
}

fn default_mqtt_port() -> u16 {
    1883
}

fn default_keep_alive() -> u64 {
    30
}

fn default_max_packet_size() -> usize {
    1024 * 1024
}

fn default_request_topic() -> String {
    "voice/tts/generate".to_string()
}

fn default_action_topic() -> String {
    "satellite/{room}/action".to_string()
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: default_mqtt_host(),
            port: default_mqtt_port(),
            client_id: String::new(),
            keep_alive_secs: default_keep_alive(),
            max_packet_size: default_max_packet_size(),
            request_topic: default_request_topic(),
            action_topic: default_action_topic(),
        }
    }
}

impl MqttConfig {
    pub fn client_config(&self) -> MqttClientConfig {
        MqttClientConfig {
            host: self.host.clone(),
            port: self.port,
            client_id: self.client_id.clone(),
            keep_alive_secs: self.keep_alive_secs,
            max_packet_size: self.max_packet_size,
        }
    }
}

/// S3 兼容对象存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub access_key: String,

    #[serde(default)]
    pub secret_key: String,

    #[serde(default)]
    pub bucket: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// 缓存探测出错（非 404）时是否继续合成
    #[serde(default = "default_fail_open")]
    pub fail_open_on_probe_error: bool,
}

fn default_region() -> String {
    "garage".to_string()
}

fn default_fail_open() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            bucket: String::new(),
            region: default_region(),
            fail_open_on_probe_error: default_fail_open(),
        }
    }
}

impl StorageConfig {
    pub fn s3_config(&self) -> S3StoreConfig {
        S3StoreConfig {
            endpoint: self.endpoint.clone(),
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            bucket: self.bucket.clone(),
            region: self.region.clone(),
        }
    }
}

/// Worker 配置
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// 最大并发合成数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// 等待队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// 退出时等待进行中任务的时间（秒）
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
}

fn default_max_concurrent() -> usize {
    2
}

fn default_queue_capacity() -> usize {
    32
}

fn default_shutdown_timeout() -> u64 {
    30
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            queue_capacity: default_queue_capacity(),
            shutdown_timeout_secs: default_shutdown_timeout(),
        }
    }
}

impl WorkerConfig {
    pub fn worker_config(&self) -> SynthesisWorkerConfig {
        SynthesisWorkerConfig {
            max_concurrent: self.max_concurrent,
            queue_capacity: self.queue_capacity,
            shutdown_timeout: Duration::from_secs(self.shutdown_timeout_secs),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
