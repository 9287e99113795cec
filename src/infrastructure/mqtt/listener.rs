//! MQTT Listener - 订阅合成请求并入队
//!
//! 事件循环只做解析和入队，合成在 SynthesisWorker 中进行

use rumqttc::{
    AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS,
    StateError,
};
use std::future::Future;
use std::time::Duration;

use super::messages::SpeechJob;
use crate::infrastructure::worker::JobSender;

/// 无法解析的包导致断线后，重连前的等待时间
const UNREADABLE_PACKET_BACKOFF: Duration = Duration::from_millis(500);

/// 关闭时等待 DISCONNECT 发出的上限
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Broker 连接参数
#[derive(Debug, Clone)]
pub struct MqttClientConfig {
    pub host: String,
    pub port: u16,
    /// 为空时自动生成
    pub client_id: String,
    pub keep_alive_secs: u64,
    /// 收发包大小上限（字节）
    pub max_packet_size: usize,
}

fn resolve_client_id(configured: &str) -> String {
    let configured = configured.trim();
    if configured.is_empty() {
        format!("piper-worker-{}", uuid::Uuid::new_v4().simple())
    } else {
        configured.to_string()
    }
}

/// 创建 client 与事件循环，连接在第一次 poll 时建立
pub fn mqtt_client(config: &MqttClientConfig) -> (AsyncClient, EventLoop) {
    let client_id = resolve_client_id(&config.client_id);
    tracing::debug!(client_id = %client_id, host = %config.host, port = config.port, "Creating MQTT client");

    let mut options = MqttOptions::new(client_id, config.host.clone(), config.port);
    options.set_keep_alive(Duration::from_secs(config.keep_alive_secs.max(5)));
    options.set_max_packet_size(config.max_packet_size, config.max_packet_size);

    AsyncClient::new(options, 64)
}

/// 请求监听器
pub struct MqttListener {
    request_topic: String,
    jobs: JobSender,
}

impl MqttListener {
    pub fn new(request_topic: impl Into<String>, jobs: JobSender) -> Self {
        Self {
            request_topic: request_topic.into(),
            jobs,
        }
    }

    /// 处理一条消息，返回是否成功入队
    pub fn route_message(&self, topic: &str, payload: &[u8]) -> bool {
        if topic != self.request_topic {
            tracing::debug!(topic = %topic, "Ignoring message on unexpected topic");
            return false;
        }

        match SpeechJob::parse(payload) {
            Ok(job) => {
                tracing::info!(room = %job.room, "Received TTS request");
                self.jobs.submit(job)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Received invalid payload");
                false
            }
        }
    }

    /// 运行事件循环，直到 shutdown 完成或 broker 出错
    ///
    /// 每次 ConnAck 后重新订阅。单个无法解析的包（例如超过大小上限）
    /// 只丢弃该包，下一次 poll 时重连
    pub async fn run<F>(
        self,
        client: AsyncClient,
        mut eventloop: EventLoop,
        shutdown: F,
    ) -> Result<(), ConnectionError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutting down MQTT listener");
                    disconnect(&client, &mut eventloop).await;
                    return Ok(());
                }
                event = eventloop.poll() => match event {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        tracing::info!("Connected to MQTT broker");
                        match client.try_subscribe(self.request_topic.clone(), QoS::AtMostOnce) {
                            Ok(()) => tracing::info!(topic = %self.request_topic, "Listening for tasks"),
                            Err(e) => tracing::error!(error = %e, "Failed to subscribe"),
                        }
                    }
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        self.route_message(&publish.topic, &publish.payload);
                    }
                    Ok(_) => {}
                    Err(ConnectionError::MqttState(StateError::Deserialization(e))) => {
                        tracing::warn!(error = %e, "Dropped unreadable MQTT packet, reconnecting");
                        tokio::time::sleep(UNREADABLE_PACKET_BACKOFF).await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "MQTT error");
                        return Err(e);
                    }
                }
            }
        }
    }
}

/// 发送 DISCONNECT 并驱动事件循环直到它被写出
async fn disconnect(client: &AsyncClient, eventloop: &mut EventLoop) {
    if let Err(e) = client.try_disconnect() {
        tracing::debug!(error = %e, "Disconnect request failed");
        return;
    }

    let sent = tokio::time::timeout(DISCONNECT_TIMEOUT, async {
        loop {
            match eventloop.poll().await {
                Ok(Event::Outgoing(Outgoing::Disconnect)) | Err(_) => break,
                Ok(_) => {}
            }
        }
    })
    .await;

    if sent.is_err() {
        tracing::debug!("Timed out waiting for MQTT disconnect");
    }
}
