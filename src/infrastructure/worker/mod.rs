//! Worker Layer - Background Task Processing
//!
//! 实现 SynthesisWorker，处理 MQTT 下发的合成任务

mod synthesis_worker;

pub use synthesis_worker::{job_queue, JobSender, SynthesisWorker, SynthesisWorkerConfig};
