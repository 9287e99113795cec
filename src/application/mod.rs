//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TtsEngine、VoiceCache、ObjectStore、Transcoder 等）
//! - commands: 合成命令及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{
    handlers::{
        SpeechSettings, SynthesizeAndUploadHandler, SynthesizeSpeechHandler,
    },
    SpeechAudio, SynthesizeAndUpload, SynthesizeSpeech,
};

pub use error::ApplicationError;

pub use ports::{
    // Publishing
    ActionPublisherPort,
    PublishError,
    // Transcoder
    AudioTranscoderPort,
    TranscodeConfig,
    TranscodeError,
    // Model download
    FetchError,
    ModelFetcherPort,
    // Object storage
    ObjectStorePort,
    StorageError,
    // TTS engine
    AudioInfo,
    SynthesisOptions,
    TtsEnginePort,
    TtsError,
    // Voice cache
    VoiceCachePort,
};
