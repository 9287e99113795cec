//! Action Publisher Port - 向房间卫星端下发动作

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Broker error: {0}")]
    BrokerError(String),
}

/// Action Publisher Port
#[async_trait]
pub trait ActionPublisherPort: Send + Sync {
    /// 通知 `room` 播放对象存储中的 `filename`
    async fn publish_play_audio(&self, room: &str, filename: &str) -> Result<(), PublishError>;
}
