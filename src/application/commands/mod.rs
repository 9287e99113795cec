//! 应用层 - 命令
//!
//! 两条合成流水线：HTTP 同步合成、Worker 合成并上传

mod speech_commands;

pub mod handlers;

pub use speech_commands::*;
