use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    pub provider: String,
    pub model: Option<String>,
    pub language: Option<String>,
    pub sample_rate_hz: u32,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            provider: "deepgram".to_string(),
            model: Some("nova-3".to_string()),
            language: Some("multi".to_string()),
            sample_rate_hz: 16_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub provider: String,
    pub model: Option<String>,
    pub voice: Option<String>,
    pub sample_rate_hz: u32,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: "cartesia".to_string(),
            model: Some("sonic-2".to_string()),
            voice: Some("7b2c0a2e-3dd3-4a44-b16b-26ecd8134279".to_string()),
            sample_rate_hz: 24_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VadConfig {
    pub provider: String,
    /// RMS level (0..=i16::MAX) above which a frame counts as speech.
    pub energy_threshold: f32,
    /// Consecutive speech frames required before speech is reported.
    pub min_speech_frames: u32,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            provider: "silero".to_string(),
            energy_threshold: 500.0,
            min_speech_frames: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnDetectionConfig {
    pub provider: String,
    pub min_silence_ms: u64,
}

impl Default for TurnDetectionConfig {
    fn default() -> Self {
        Self {
            provider: "multilingual".to_string(),
            min_silence_ms: 700,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    /// Chat-completions URL; `None` uses the provider's public endpoint.
    pub endpoint: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            model: "llama3-70b-8192".to_string(),
            endpoint: None,
            temperature: 0.7,
            max_tokens: 512,
            timeout_secs: 30,
        }
    }
}

/// Full engine line-up handed to the agent runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSpec {
    pub stt: SttConfig,
    pub llm: LlmConfig,
    pub tts: TtsConfig,
    pub vad: VadConfig,
    pub turn_detection: TurnDetectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
    pub ts: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}
