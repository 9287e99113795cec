//! TTS Adapter - Piper 引擎实现

mod fake_tts_engine;
mod piper_engine;
mod wav;

pub use fake_tts_engine::{FakeTtsEngine, FakeTtsEngineConfig};
pub use piper_engine::{PiperEngine, PiperEngineConfig};
pub use wav::{encode_pcm16_wav, probe_wav};
