//! Transcoder Adapter - 音频格式转换

mod ffmpeg_transcoder;

pub use ffmpeg_transcoder::FfmpegTranscoder;
