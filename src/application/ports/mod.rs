//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod action_publisher;
mod audio_transcoder;
mod model_fetcher;
mod object_store;
mod tts_engine;
mod voice_cache;

pub use action_publisher::{ActionPublisherPort, PublishError};
pub use audio_transcoder::{AudioTranscoderPort, TranscodeConfig, TranscodeError};
pub use model_fetcher::{FetchError, ModelFetcherPort};
pub use object_store::{ObjectStorePort, StorageError};
pub use tts_engine::{AudioInfo, SynthesisOptions, TtsEnginePort, TtsError};
pub use voice_cache::VoiceCachePort;
