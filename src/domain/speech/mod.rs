//! Speech Context - 语音合成请求
//!
//! 职责:
//! - 文本校验
//! - 输出格式与 Content-Type
//! - 内容寻址缓存 key

mod value_objects;

pub use value_objects::{CacheKey, OutputFormat, SpeechText};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Input text cannot be empty")]
    EmptyText,

    #[error("Unsupported response format: {0}")]
    InvalidFormat(String),
}
