//! Synthesis Worker - 后台合成任务处理
//!
//! MQTT 监听器只负责把任务放入有界队列，本 Worker 消费队列：
//! 探测缓存 / 合成 / 上传，成功后向房间下发 play_audio 动作

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

use crate::application::ports::ActionPublisherPort;
use crate::application::{SynthesizeAndUpload, SynthesizeAndUploadHandler};
use crate::infrastructure::mqtt::SpeechJob;

/// Worker 配置
#[derive(Debug, Clone)]
pub struct SynthesisWorkerConfig {
    /// 最大并发合成数
    pub max_concurrent: usize,
    /// 队列容量，满了直接拒绝
    pub queue_capacity: usize,
    /// 停止时等待进行中任务的最长时间
    pub shutdown_timeout: Duration,
}

impl Default for SynthesisWorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 2,
            queue_capacity: 32,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// 任务入队端
#[derive(Clone)]
pub struct JobSender {
    tx: mpsc::Sender<SpeechJob>,
}

impl JobSender {
    /// 非阻塞提交，不会让 MQTT 事件循环等待合成
    pub fn submit(&self, job: SpeechJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                tracing::warn!(room = %job.room, "Synthesis queue full, rejecting job");
                false
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                tracing::warn!(room = %job.room, "Synthesis worker stopped, dropping job");
                false
            }
        }
    }
}

/// 创建任务队列
pub fn job_queue(capacity: usize) -> (JobSender, mpsc::Receiver<SpeechJob>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (JobSender { tx }, rx)
}

/// 合成 Worker
pub struct SynthesisWorker {
    config: SynthesisWorkerConfig,
    queue_receiver: mpsc::Receiver<SpeechJob>,
    handler: Arc<SynthesizeAndUploadHandler>,
    publisher: Arc<dyn ActionPublisherPort>,
}

impl SynthesisWorker {
    pub fn new(
        config: SynthesisWorkerConfig,
        queue_receiver: mpsc::Receiver<SpeechJob>,
        handler: Arc<SynthesizeAndUploadHandler>,
        publisher: Arc<dyn ActionPublisherPort>,
    ) -> Self {
        Self {
            config,
            queue_receiver,
            handler,
            publisher,
        }
    }

    /// 运行到所有 JobSender 被 drop，然后等待进行中的任务
    pub async fn run(mut self) {
        let max_concurrent = self.config.max_concurrent.max(1);
        tracing::info!(max_concurrent, "SynthesisWorker started");

        let semaphore = Arc::new(Semaphore::new(max_concurrent));

        while let Some(job) = self.queue_receiver.recv().await {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    tracing::error!("Failed to acquire semaphore permit");
                    continue;
                }
            };

            let handler = self.handler.clone();
            let publisher = self.publisher.clone();

            tokio::spawn(async move {
                let _permit = permit; // 持有 permit 直到任务完成
                Self::process_job(job, handler, publisher).await;
            });
        }

        // 拿到全部 permit 即所有任务已结束
        let drained = tokio::time::timeout(
            self.config.shutdown_timeout,
            semaphore.acquire_many(max_concurrent as u32),
        )
        .await;

        match drained {
            Ok(_) => tracing::info!("SynthesisWorker stopped"),
            Err(_) => tracing::warn!(
                timeout_secs = self.config.shutdown_timeout.as_secs(),
                "SynthesisWorker stopped with jobs still running"
            ),
        }
    }

    /// 处理单个任务，失败只记录日志
    async fn process_job(
        job: SpeechJob,
        handler: Arc<SynthesizeAndUploadHandler>,
        publisher: Arc<dyn ActionPublisherPort>,
    ) {
        let room = job.room;

        let key = match handler.handle(SynthesizeAndUpload { text: job.text }).await {
            Ok(key) => key,
            Err(e) => {
                tracing::error!(room = %room, error = %e, "Failed to generate TTS");
                return;
            }
        };

        match publisher.publish_play_audio(&room, key.as_str()).await {
            Ok(()) => tracing::info!(room = %room, key = %key, "Published audio action"),
            Err(e) => {
                tracing::error!(room = %room, key = %key, error = %e, "Failed to publish audio action")
            }
        }
    }
}
