//! Memory Layer - In-Memory State Management
//!
//! 音色缓存（进程内唯一的共享可变状态），以及对象存储 / 动作下发的内存实现

mod action_recorder;
mod object_store;
mod voice_cache;

pub use action_recorder::{PublishedAction, RecordingActionPublisher};
pub use object_store::{InMemoryObjectStore, StoredObject};
pub use voice_cache::{InMemoryVoiceCache, VoiceCacheConfig};
