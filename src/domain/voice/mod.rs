//! Voice Context - 音色限界上下文
//!
//! 职责:
//! - Piper 音色标识解析
//! - 模型文件位置 / 下载地址推导
//! - 已加载音色

mod aggregate;
mod errors;
mod value_objects;

pub use aggregate::LoadedVoice;
pub use errors::VoiceError;
pub use value_objects::{ModelFiles, ModelUrls, VoiceName};
