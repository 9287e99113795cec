//! MQTT Layer - 合成请求订阅与动作下发

mod listener;
mod messages;
mod publisher;

pub use listener::{mqtt_client, MqttClientConfig, MqttListener};
pub use messages::{action_topic, play_audio_payload, JobParseError, SpeechJob};
pub use publisher::MqttActionPublisher;
