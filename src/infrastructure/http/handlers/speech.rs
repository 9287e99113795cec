//! Speech Handler - OpenAI 兼容的 `/v1/audio/speech`

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use futures_util::StreamExt;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::application::SynthesizeSpeech;
use crate::infrastructure::http::dto::SpeechRequest;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

pub async fn create_speech(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SpeechRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let cmd = SynthesizeSpeech {
        text: req.input,
        voice: req.voice,
        response_format: req.response_format,
        speed: req.speed,
    };

    let audio = state.speech_handler.handle(cmd).await?;

    let file = tokio::fs::File::open(audio.path())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let len = file
        .metadata()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .len();
    let content_type = audio.content_type().to_string();

    // 临时文件跟随响应体流一起释放
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _keep = &audio;
        chunk
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, len)
        .body(Body::from_stream(stream))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
