//! MQTT Action Publisher
//!
//! 向 `satellite/{room}/action` 发布 play_audio 动作

use async_trait::async_trait;
use rumqttc::{AsyncClient, QoS};

use super::messages::{action_topic, play_audio_payload};
use crate::application::ports::{ActionPublisherPort, PublishError};

pub struct MqttActionPublisher {
    client: AsyncClient,
    /// topic 模板，包含 `{room}` 占位符
    topic_template: String,
}

impl MqttActionPublisher {
    pub fn new(client: AsyncClient, topic_template: impl Into<String>) -> Self {
        Self {
            client,
            topic_template: topic_template.into(),
        }
    }
}

#[async_trait]
impl ActionPublisherPort for MqttActionPublisher {
    async fn publish_play_audio(&self, room: &str, filename: &str) -> Result<(), PublishError> {
        let payload = play_audio_payload(filename)
            .map_err(|e| PublishError::SerializationError(e.to_string()))?;
        let topic = action_topic(&self.topic_template, room);

        tracing::info!(room = %room, topic = %topic, "Publishing audio action");

        self.client
            .publish(topic, QoS::AtMostOnce, false, payload)
            .await
            .map_err(|e| PublishError::BrokerError(e.to_string()))
    }
}
