//! Voice Handlers

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::infrastructure::http::dto::VoicesResponse;
use crate::infrastructure::http::state::AppState;

/// 当前已加载的音色
pub async fn list_voices(State(state): State<Arc<AppState>>) -> Json<VoicesResponse> {
    Json(VoicesResponse {
        default_voice: state.speech_handler.default_voice().to_string(),
        loaded: state.voices.loaded_voices(),
    })
}
