//! Application State

use std::sync::Arc;

use crate::application::{SynthesizeSpeechHandler, VoiceCachePort};

/// 应用状态
pub struct AppState {
    pub voices: Arc<dyn VoiceCachePort>,
    pub speech_handler: SynthesizeSpeechHandler,
}

impl AppState {
    pub fn new(voices: Arc<dyn VoiceCachePort>, speech_handler: SynthesizeSpeechHandler) -> Self {
        Self {
            voices,
            speech_handler,
        }
    }
}
