//! Command Line Arguments
//!
//! 两个可执行文件各自的参数，提供时覆盖环境变量与配置文件

use clap::Parser;
use config::Value;
use std::path::PathBuf;

use super::loader::ConfigOverrides;

/// HTTP 服务参数
#[derive(Debug, Parser)]
#[command(name = "piper-gateway")]
#[command(version)]
#[command(about = "OpenAI compatible speech API backed by Piper", long_about = None)]
pub struct ApiArgs {
    /// 监听地址
    #[arg(long)]
    pub host: Option<String>,

    /// 监听端口
    #[arg(long)]
    pub port: Option<u16>,

    /// 模型文件目录
    #[arg(long)]
    pub models_dir: Option<PathBuf>,

    /// 默认音色
    #[arg(long)]
    pub default_voice: Option<String>,

    /// 日志级别
    #[arg(long)]
    pub log_level: Option<String>,

    /// 配置文件路径
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ApiArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        push(&mut overrides, "server.host", self.host.clone());
        push(&mut overrides, "server.port", self.port.map(i64::from));
        push_path(&mut overrides, "models.dir", &self.models_dir);
        push(&mut overrides, "models.default_voice", self.default_voice.clone());
        push(&mut overrides, "log.level", self.log_level.clone());
        overrides
    }
}

/// Worker 参数
#[derive(Debug, Parser)]
#[command(name = "piper-worker")]
#[command(version)]
#[command(about = "MQTT driven Piper synthesis worker with S3 cache", long_about = None)]
pub struct WorkerArgs {
    #[arg(long)]
    pub mqtt_host: Option<String>,

    #[arg(long)]
    pub mqtt_port: Option<u16>,

    /// S3 兼容存储地址
    #[arg(long)]
    pub s3_endpoint: Option<String>,

    #[arg(long)]
    pub s3_access_key: Option<String>,

    #[arg(long)]
    pub s3_secret_key: Option<String>,

    #[arg(long)]
    pub s3_bucket: Option<String>,

    /// 模型文件目录
    #[arg(long)]
    pub models_dir: Option<PathBuf>,

    /// 默认音色，缓存 key 也基于它计算
    #[arg(long)]
    pub default_voice: Option<String>,

    /// 日志级别
    #[arg(long)]
    pub log_level: Option<String>,

    /// 配置文件路径
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl WorkerArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        push(&mut overrides, "mqtt.host", self.mqtt_host.clone());
        push(&mut overrides, "mqtt.port", self.mqtt_port.map(i64::from));
        push(&mut overrides, "storage.endpoint", self.s3_endpoint.clone());
        push(&mut overrides, "storage.access_key", self.s3_access_key.clone());
        push(&mut overrides, "storage.secret_key", self.s3_secret_key.clone());
        push(&mut overrides, "storage.bucket", self.s3_bucket.clone());
        push_path(&mut overrides, "models.dir", &self.models_dir);
        push(&mut overrides, "models.default_voice", self.default_voice.clone());
        push(&mut overrides, "log.level", self.log_level.clone());
        overrides
    }
}

fn push<T: Into<Value>>(overrides: &mut ConfigOverrides, key: &'static str, value: Option<T>) {
    if let Some(value) = value {
        overrides.push((key, value.into()));
    }
}

fn push_path(overrides: &mut ConfigOverrides, key: &'static str, value: &Option<PathBuf>) {
    push(
        overrides,
        key,
        value.as_ref().map(|p| p.to_string_lossy().into_owned()),
    );
}
