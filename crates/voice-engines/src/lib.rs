//! voice-engines: capability-provider traits (STT, TTS, VAD, turn detection,
//! language model) with local stand-ins and an HTTP chat backend

mod error;
pub use error::{EngineError, Result};

mod types;
pub use types::{
    ChatMessage, ChatRole, LlmConfig, PipelineSpec, SttConfig, Transcript, TtsConfig,
    TurnDetectionConfig, VadConfig,
};

mod traits;
pub use traits::{LanguageModel, SpeechToText, TextToSpeech, TurnDetector, VoiceActivityDetector};

#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "mock")]
pub use mock::{EnergyVad, MockLlm, MockTts, ScriptedStt, SilenceTurnDetector};

#[cfg(feature = "groq-http")]
mod groq;
#[cfg(feature = "groq-http")]
pub use groq::{GroqLlm, GROQ_CHAT_ENDPOINT};

pub mod plugin;
