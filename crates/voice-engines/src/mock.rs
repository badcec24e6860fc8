use crate::{
    ChatMessage, EngineError, LanguageModel, Result, SpeechToText, SttConfig, TextToSpeech,
    Transcript, TtsConfig, TurnDetectionConfig, TurnDetector, VadConfig, VoiceActivityDetector,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use time::OffsetDateTime;

/// Speech-to-text stand-in that emits a scripted line whenever audio was
/// pushed since the previous poll.
pub struct ScriptedStt {
    cfg: SttConfig,
    lines: VecDeque<String>,
    pending_samples: u64,
    consumed_samples: u64,
}

impl ScriptedStt {
    pub fn new(config: SttConfig, lines: impl IntoIterator<Item = String>) -> Self {
        Self {
            cfg: config,
            lines: lines.into_iter().collect(),
            pending_samples: 0,
            consumed_samples: 0,
        }
    }

    fn samples_to_ms(&self, samples: u64) -> u64 {
        samples * 1000 / u64::from(self.cfg.sample_rate_hz.max(1))
    }
}

impl SpeechToText for ScriptedStt {
    fn push_audio(&mut self, pcm_s16le: &[i16]) {
        self.pending_samples += pcm_s16le.len() as u64;
    }

    fn poll(&mut self) -> Option<Transcript> {
        if self.pending_samples == 0 {
            return None;
        }
        let text = self.lines.pop_front()?;
        let start = self.consumed_samples;
        self.consumed_samples += self.pending_samples;
        self.pending_samples = 0;
        Some(Transcript {
            start_ms: self.samples_to_ms(start),
            end_ms: self.samples_to_ms(self.consumed_samples),
            text,
            ts: Some(OffsetDateTime::now_utc()),
        })
    }
}

pub struct MockTts {
    cfg: TtsConfig,
}

impl MockTts {
    pub fn new(config: TtsConfig) -> Self {
        Self { cfg: config }
    }
}

impl TextToSpeech for MockTts {
    fn synthesize(&mut self, text: &str) -> Vec<i16> {
        // Short 440Hz sine placeholder in S16LE scaled by text length
        let sr = self.cfg.sample_rate_hz.max(8000);
        let dur_s = (text.len() as f32 / 10.0).clamp(0.2, 1.0);
        let frames = (sr as f32 * dur_s) as usize;
        let freq = 440.0_f32;
        (0..frames)
            .map(|n| {
                let t = n as f32 / sr as f32;
                ((2.0 * std::f32::consts::PI * freq * t).sin() * 3000.0) as i16
            })
            .collect()
    }

    fn sample_rate_hz(&self) -> u32 {
        self.cfg.sample_rate_hz.max(8000)
    }
}

/// RMS-energy voice activity detector with a short onset debounce.
pub struct EnergyVad {
    cfg: VadConfig,
    consecutive: u32,
}

impl EnergyVad {
    pub fn new(config: VadConfig) -> Self {
        Self {
            cfg: config,
            consecutive: 0,
        }
    }

    fn rms(frame: &[i16]) -> f32 {
        if frame.is_empty() {
            return 0.0;
        }
        let sum: f64 = frame.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
        (sum / frame.len() as f64).sqrt() as f32
    }
}

impl VoiceActivityDetector for EnergyVad {
    fn is_speech(&mut self, frame: &[i16]) -> bool {
        if Self::rms(frame) >= self.cfg.energy_threshold {
            self.consecutive = self.consecutive.saturating_add(1);
        } else {
            self.consecutive = 0;
        }
        self.consecutive >= self.cfg.min_speech_frames.max(1)
    }

    fn reset(&mut self) {
        self.consecutive = 0;
    }
}

/// Ends a turn after enough trailing silence; a sentence-final mark halves
/// the wait.
pub struct SilenceTurnDetector {
    cfg: TurnDetectionConfig,
}

impl SilenceTurnDetector {
    pub fn new(config: TurnDetectionConfig) -> Self {
        Self { cfg: config }
    }
}

impl TurnDetector for SilenceTurnDetector {
    fn is_end_of_turn(&self, transcript: &str, trailing_silence_ms: u64) -> bool {
        let text = transcript.trim_end();
        if text.is_empty() {
            return false;
        }
        let wait = if text.ends_with(['?', '.', '!']) {
            self.cfg.min_silence_ms / 2
        } else {
            self.cfg.min_silence_ms
        };
        trailing_silence_ms >= wait
    }
}

/// Language model stub that replays canned replies and records every prompt.
pub struct MockLlm {
    replies: Mutex<VecDeque<String>>,
    default_reply: Option<String>,
    prompts: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockLlm {
    pub fn new(default_reply: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            default_reply: Some(default_reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A backend whose every call fails.
    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            default_reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_replies(self, replies: impl IntoIterator<Item = String>) -> Self {
        if let Ok(mut queue) = self.replies.lock() {
            queue.extend(replies);
        }
        self
    }

    pub fn prompts(&self) -> Vec<Vec<ChatMessage>> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for MockLlm {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(messages.to_vec());
        }
        let queued = self.replies.lock().ok().and_then(|mut q| q.pop_front());
        queued
            .or_else(|| self.default_reply.clone())
            .ok_or_else(|| EngineError::Backend("mock language model failure".into()))
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
