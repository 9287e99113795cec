//! Recording Action Publisher
//!
//! 记录所有下发动作，不连接 broker

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::application::ports::{ActionPublisherPort, PublishError};

/// 一次 play_audio 下发
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedAction {
    pub room: String,
    pub filename: String,
}

#[derive(Default)]
pub struct RecordingActionPublisher {
    published: Mutex<Vec<PublishedAction>>,
    fail: AtomicBool,
}

impl RecordingActionPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<PublishedAction> {
        self.published
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ActionPublisherPort for RecordingActionPublisher {
    async fn publish_play_audio(&self, room: &str, filename: &str) -> Result<(), PublishError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(PublishError::BrokerError("injected publish failure".to_string()));
        }
        let mut published = self
            .published
            .lock()
            .map_err(|e| PublishError::BrokerError(e.to_string()))?;
        published.push(PublishedAction {
            room: room.to_string(),
            filename: filename.to_string(),
        });
        Ok(())
    }
}
