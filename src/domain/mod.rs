//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Voice Context: Piper 音色标识、模型文件、已加载音色
//! - Speech Context: 合成文本、输出格式、缓存 key

pub mod speech;
pub mod voice;
