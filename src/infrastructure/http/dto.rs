//! Data Transfer Objects

use serde::{Deserialize, Serialize};

// ============================================================================
// Speech DTOs
// ============================================================================

fn default_response_format() -> String {
    "wav".to_string()
}

fn default_speed() -> f32 {
    1.0
}

/// OpenAI 风格的合成请求，`model` 等未知字段直接忽略
#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    pub input: String,
    #[serde(default)]
    pub voice: Option<String>,
    #[serde(default = "default_response_format")]
    pub response_format: String,
    #[serde(default = "default_speed")]
    pub speed: f32,
}

// ============================================================================
// Voice DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub default_voice: String,
    pub loaded: Vec<String>,
}
