//! Configuration Module
//!
//! 提供应用配置管理功能，支持多层级配置来源：
//! - 命令行参数（最高优先级）
//! - 环境变量（`PIPER_` 前缀）
//! - 配置文件（TOML 格式）
//! - 默认值（最低优先级）

mod cli;
mod loader;
mod types;

pub use cli::{ApiArgs, WorkerArgs};
pub use loader::{
    load_config_from_path, print_config, print_worker_config, validate_config,
    validate_worker_config, ConfigError, ConfigOverrides,
};
pub use types::{
    AppConfig, LogConfig, ModelsConfig, MqttConfig, PiperConfig, ServerConfig, StorageConfig,
    SynthesisConfig, TranscoderConfig, WorkerConfig,
};
