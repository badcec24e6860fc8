//! PCM frames in, finished user turns out

use intent_router::Utterance;
use tracing::debug;
use voice_engines::plugin::{new_stt_backend, new_turn_detector, new_vad_backend};
use voice_engines::{EngineError, PipelineSpec, SpeechToText, TurnDetector, VoiceActivityDetector};

pub struct VoicePipeline {
    stt: Box<dyn SpeechToText + Send>,
    vad: Box<dyn VoiceActivityDetector + Send>,
    turn: Box<dyn TurnDetector + Send>,
    sample_rate_hz: u32,
    transcript: String,
    trailing_silence_ms: u64,
}

impl VoicePipeline {
    pub fn new(
        stt: Box<dyn SpeechToText + Send>,
        vad: Box<dyn VoiceActivityDetector + Send>,
        turn: Box<dyn TurnDetector + Send>,
        sample_rate_hz: u32,
    ) -> Self {
        Self {
            stt,
            vad,
            turn,
            sample_rate_hz: sample_rate_hz.max(1),
            transcript: String::new(),
            trailing_silence_ms: 0,
        }
    }

    /// Build the local engines named in `spec`. Runtime-provided engines
    /// (deepgram, silero, multilingual) fail with `Unsupported`.
    pub fn from_spec(spec: &PipelineSpec, script: Vec<String>) -> Result<Self, EngineError> {
        let stt = new_stt_backend(spec.stt.clone(), script)?;
        let vad = new_vad_backend(spec.vad.clone())?;
        let turn = new_turn_detector(spec.turn_detection.clone())?;
        Ok(Self::new(stt, vad, turn, spec.stt.sample_rate_hz))
    }

    /// Feed one mono S16LE frame. Returns the utterance once the turn
    /// detector closes the turn.
    pub fn push_frame(&mut self, frame: &[i16]) -> Option<Utterance> {
        if self.vad.is_speech(frame) {
            self.stt.push_audio(frame);
            self.trailing_silence_ms = 0;
        } else {
            self.trailing_silence_ms += frame.len() as u64 * 1000 / u64::from(self.sample_rate_hz);
        }

        while let Some(segment) = self.stt.poll() {
            self.append(&segment.text);
        }

        if self
            .turn
            .is_end_of_turn(&self.transcript, self.trailing_silence_ms)
        {
            debug!(silence_ms = self.trailing_silence_ms, "end of turn");
            return self.take_turn();
        }
        None
    }

    /// Close the current turn regardless of silence, e.g. at stream end.
    pub fn flush(&mut self) -> Option<Utterance> {
        if let Some(segment) = self.stt.finish() {
            self.append(&segment.text);
        }
        self.take_turn()
    }

    pub fn pending_text(&self) -> &str {
        &self.transcript
    }

    fn append(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.transcript.is_empty() {
            self.transcript.push(' ');
        }
        self.transcript.push_str(text);
    }

    fn take_turn(&mut self) -> Option<Utterance> {
        self.trailing_silence_ms = 0;
        self.vad.reset();
        let text = std::mem::take(&mut self.transcript);
        if text.trim().is_empty() {
            None
        } else {
            Some(Utterance::new(text))
        }
    }
}
