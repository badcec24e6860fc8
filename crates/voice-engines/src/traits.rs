use crate::{ChatMessage, Result, Transcript};
use async_trait::async_trait;

pub trait SpeechToText {
    fn push_audio(&mut self, pcm_s16le: &[i16]);
    fn poll(&mut self) -> Option<Transcript>;

    /// Flush whatever the engine still buffers.
    fn finish(&mut self) -> Option<Transcript> {
        None
    }
}

pub trait TextToSpeech {
    fn synthesize(&mut self, text: &str) -> Vec<i16>;
    fn sample_rate_hz(&self) -> u32;
}

pub trait VoiceActivityDetector {
    fn is_speech(&mut self, frame: &[i16]) -> bool;
    fn reset(&mut self) {}
}

pub trait TurnDetector {
    /// Decide whether the user finished their turn given the text heard so
    /// far and the trailing silence.
    fn is_end_of_turn(&self, transcript: &str, trailing_silence_ms: u64) -> bool;
}

/// Single "generate a response" capability of a language-model backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String>;

    fn model_name(&self) -> &str;
}
