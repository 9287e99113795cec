//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 命令行参数
//! 2. 环境变量
//! 3. 配置文件（config.toml）
//! 4. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File, Value};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;
use crate::domain::voice::VoiceName;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 命令行覆盖项：(配置 key, 值)
pub type ConfigOverrides = Vec<(&'static str, Value)>;

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 扁平环境变量名 -> 配置 key
///
/// 与分层写法 (`PIPER_SERVER__PORT`) 并存，优先级高于它，低于命令行
const FLAT_ENV_KEYS: &[(&str, &str)] = &[
    ("PIPER_HOST", "server.host"),
    ("PIPER_PORT", "server.port"),
    ("PIPER_MODELS_DIR", "models.dir"),
    ("PIPER_DEFAULT_VOICE", "models.default_voice"),
    ("PIPER_LOG_LEVEL", "log.level"),
];

/// 从扁平环境变量收集覆盖项，空值忽略
fn flat_env_overrides<F>(lookup: F) -> ConfigOverrides
where
    F: Fn(&str) -> Option<String>,
{
    FLAT_ENV_KEYS
        .iter()
        .filter_map(|(var, key)| {
            lookup(*var)
                .filter(|v| !v.trim().is_empty())
                .map(|v| (*key, Value::from(v)))
        })
        .collect()
}

/// 从指定路径加载配置，并应用命令行覆盖
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
/// - `overrides` - 命令行参数，优先级最高
///
/// # 环境变量示例
/// - `PIPER_SERVER__PORT=8080` 或 `PIPER_PORT=8080`
/// - `PIPER_MODELS__DEFAULT_VOICE=en_US-lessac-medium` 或 `PIPER_DEFAULT_VOICE=...`
/// - `PIPER_MQTT__HOST=broker.local`
/// - `PIPER_STORAGE__BUCKET=tts-cache`
pub fn load_config_from_path(
    config_path: Option<&Path>,
    overrides: &[(&'static str, Value)],
) -> Result<AppConfig, ConfigError> {
    build_config(config_path, overrides, |var| std::env::var(var).ok())
}

fn build_config<F>(
    config_path: Option<&Path>,
    overrides: &[(&'static str, Value)],
    env_lookup: F,
) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 8080)?
        .set_default("models.dir", "./models")?
        .set_default("models.default_voice", "de_DE-thorsten-high")?
        .set_default(
            "models.repository_url",
            "https://huggingface.co/rhasspy/piper-voices/resolve/main",
        )?
        .set_default("models.max_loaded_voices", 0)?
        .set_default("piper.binary", "piper")?
        .set_default("synthesis.apply_speed", false)?
        .set_default("transcoder.ffmpeg_path", "ffmpeg")?
        .set_default("transcoder.sample_rate", 24000)?
        .set_default("transcoder.bitrate", "64k")?
        .set_default("transcoder.channels", 1)?
        .set_default("mqtt.host", "localhost")?
        .set_default("mqtt.port", 1883)?
        .set_default("mqtt.client_id", "")?
        .set_default("mqtt.keep_alive_secs", 30)?
        .set_default("mqtt.max_packet_size", 1024 * 1024)?
        .set_default("mqtt.request_topic", "voice/tts/generate")?
        .set_default("mqtt.action_topic", "satellite/{room}/action")?
        .set_default("storage.region", "garage")?
        .set_default("storage.fail_open_on_probe_error", true)?
        .set_default("worker.max_concurrent", 2)?
        .set_default("worker.queue_capacity", 32)?
        .set_default("worker.shutdown_timeout_secs", 30)?
        .set_default("log.level", "info")?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量
    // 前缀: PIPER_，层级分隔符: __ (双下划线)
    // 例如: PIPER_STORAGE__ENDPOINT=http://garage:3900
    builder = builder.add_source(
        Environment::with_prefix("PIPER")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 扁平写法: PIPER_PORT、PIPER_DEFAULT_VOICE ...
    for (key, value) in flat_env_overrides(env_lookup) {
        builder = builder.set_override(key, value)?;
    }

    // 4. 命令行参数（最高优先级，同 key 覆盖前面的值）
    for (key, value) in overrides {
        builder = builder.set_override(*key, value.clone())?;
    }

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证通用配置
pub fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    VoiceName::parse(&config.models.default_voice).map_err(|e| {
        ConfigError::ValidationError(format!("Invalid default voice: {}", e))
    })?;

    if config.models.repository_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Model repository URL cannot be empty".to_string(),
        ));
    }

    if config.transcoder.sample_rate == 0 || config.transcoder.channels == 0 {
        return Err(ConfigError::ValidationError(
            "Transcoder sample rate and channels must be positive".to_string(),
        ));
    }

    Ok(())
}

/// 验证 Worker 额外需要的配置
pub fn validate_worker_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.storage.endpoint.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Storage endpoint is required".to_string(),
        ));
    }

    if config.storage.bucket.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Storage bucket is required".to_string(),
        ));
    }

    if config.mqtt.port == 0 {
        return Err(ConfigError::ValidationError(
            "MQTT port cannot be 0".to_string(),
        ));
    }

    if config.mqtt.max_packet_size == 0 {
        return Err(ConfigError::ValidationError(
            "MQTT max packet size must be positive".to_string(),
        ));
    }

    let topic = &config.mqtt.request_topic;
    if topic.is_empty() || topic.contains(['+', '#']) {
        return Err(ConfigError::ValidationError(format!(
            "Request topic must be a concrete topic: {:?}",
            topic
        )));
    }

    if !config.mqtt.action_topic.contains("{room}") {
        return Err(ConfigError::ValidationError(
            "Action topic must contain {room}".to_string(),
        ));
    }

    if config.worker.max_concurrent == 0 || config.worker.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "Worker concurrency and queue capacity must be positive".to_string(),
        ));
    }

    Ok(())
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        "<unset>"
    } else {
        "******"
    }
}

/// 打印 HTTP 服务配置（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}", config.server.addr());
    print_common(config);
    tracing::info!("Apply Speed: {}", config.synthesis.apply_speed);
    tracing::info!(
        "Transcoder: {} ({} Hz, {}, {} ch)",
        config.transcoder.ffmpeg_path,
        config.transcoder.sample_rate,
        config.transcoder.bitrate,
        config.transcoder.channels
    );
    tracing::info!("=================================");
}

/// 打印 Worker 配置，密钥打码
pub fn print_worker_config(config: &AppConfig) {
    tracing::info!("=== Worker Configuration ===");
    tracing::info!("MQTT Broker: {}:{}", config.mqtt.host, config.mqtt.port);
    tracing::info!("Request Topic: {}", config.mqtt.request_topic);
    tracing::info!("Action Topic: {}", config.mqtt.action_topic);
    tracing::info!("Max Packet Size: {} bytes", config.mqtt.max_packet_size);
    tracing::info!("Storage Endpoint: {}", config.storage.endpoint);
    tracing::info!("Storage Bucket: {}", config.storage.bucket);
    tracing::info!("Storage Access Key: {}", mask(&config.storage.access_key));
    tracing::info!("Storage Secret Key: {}", mask(&config.storage.secret_key));
    tracing::info!("Fail Open On Probe Error: {}", config.storage.fail_open_on_probe_error);
    print_common(config);
    tracing::info!(
        "Worker: max_concurrent={}, queue_capacity={}",
        config.worker.max_concurrent,
        config.worker.queue_capacity
    );
    tracing::info!("============================");
}

fn print_common(config: &AppConfig) {
    tracing::info!("Models Directory: {:?}", config.models.dir);
    tracing::info!("Default Voice: {}", config.models.default_voice);
    tracing::info!("Model Repository: {}", config.models.repository_url);
    if config.models.max_loaded_voices > 0 {
        tracing::info!("Max Loaded Voices: {}", config.models.max_loaded_voices);
    }
    tracing::info!("Piper Binary: {}", config.piper.binary);
    tracing::info!("Log Level: {}", config.log.level);
}
