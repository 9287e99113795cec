//! MQTT 消息格式
//!
//! 请求（`voice/tts/generate`）：`{"room": "kitchen", "text": "Hallo"}`
//! 动作（`satellite/{room}/action`）：
//! `{"actions":[{"type":"play_audio","payload":{"filename":"tts_<md5>.wav"}}]}`

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 请求解析错误，调用方记录 warn 后跳过
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobParseError {
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),

    #[error("Payload missing 'room' or 'text'")]
    MissingField,

    #[error("Room contains MQTT wildcard: {0}")]
    InvalidRoom(String),
}

#[derive(Debug, Deserialize)]
struct RawJob {
    #[serde(default)]
    room: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// 一条合成任务
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechJob {
    pub room: String,
    pub text: String,
}

impl SpeechJob {
    pub fn parse(payload: &[u8]) -> Result<Self, JobParseError> {
        let raw: RawJob = serde_json::from_slice(payload)
            .map_err(|e| JobParseError::InvalidJson(e.to_string()))?;

        let room = raw
            .room
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .ok_or(JobParseError::MissingField)?;
        // text 原样保留，缓存 key 基于原文计算
        let text = raw
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or(JobParseError::MissingField)?;

        if room.contains(['+', '#']) {
            return Err(JobParseError::InvalidRoom(room));
        }

        Ok(Self { room, text })
    }
}

#[derive(Debug, Serialize)]
struct PlayAudioPayload<'a> {
    filename: &'a str,
}

#[derive(Debug, Serialize)]
struct Action<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    payload: PlayAudioPayload<'a>,
}

#[derive(Debug, Serialize)]
struct ActionEnvelope<'a> {
    actions: Vec<Action<'a>>,
}

/// 序列化 play_audio 动作
pub fn play_audio_payload(filename: &str) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&ActionEnvelope {
        actions: vec![Action {
            kind: "play_audio",
            payload: PlayAudioPayload { filename },
        }],
    })
}

/// 用房间名填充 topic 模板中的 `{room}`
pub fn action_topic(template: &str, room: &str) -> String {
    template.replace("{room}", room)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_job() {
        let job = SpeechJob::parse(br#"{"room": "kitchen", "text": "Hallo"}"#).unwrap();
        assert_eq!(job.room, "kitchen");
        assert_eq!(job.text, "Hallo");
    }

    #[test]
    fn test_text_is_kept_verbatim() {
        let job = SpeechJob::parse(br#"{"room": "kitchen", "text": " Hallo "}"#).unwrap();
        assert_eq!(job.text, " Hallo ");
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        assert_eq!(
            SpeechJob::parse(br#"{"text": "Hallo"}"#),
            Err(JobParseError::MissingField)
        );
        assert_eq!(
            SpeechJob::parse(br#"{"room": "kitchen"}"#),
            Err(JobParseError::MissingField)
        );
        assert_eq!(
            SpeechJob::parse(br#"{"room": "", "text": "Hallo"}"#),
            Err(JobParseError::MissingField)
        );
        assert_eq!(
            SpeechJob::parse(br#"{"room": "kitchen", "text": "   "}"#),
            Err(JobParseError::MissingField)
        );
    }

    #[test]
    fn test_parse_rejects_bad_json() {
        assert!(matches!(
            SpeechJob::parse(b"not json"),
            Err(JobParseError::InvalidJson(_))
        ));
        assert!(matches!(
            SpeechJob::parse(br#"{"room": 1, "text": "Hallo"}"#),
            Err(JobParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_parse_rejects_wildcard_rooms() {
        for room in ["kit+chen", "#", "floor/#"] {
            let payload = format!(r#"{{"room": "{}", "text": "Hallo"}}"#, room);
            assert!(matches!(
                SpeechJob::parse(payload.as_bytes()),
                Err(JobParseError::InvalidRoom(_))
            ));
        }
    }

    #[test]
    fn test_play_audio_payload() {
        let bytes = play_audio_payload("tts_7cc3898d2325af6b4eaf55ce838568bd.wav").unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "actions": [{
                    "type": "play_audio",
                    "payload": {"filename": "tts_7cc3898d2325af6b4eaf55ce838568bd.wav"}
                }]
            })
        );
    }

    #[test]
    fn test_action_topic() {
        assert_eq!(
            action_topic("satellite/{room}/action", "kitchen"),
            "satellite/kitchen/action"
        );
    }
}
