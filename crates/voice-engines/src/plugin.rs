#[cfg(feature = "groq-http")]
use crate::GroqLlm;
#[cfg(feature = "mock")]
use crate::{EnergyVad, MockLlm, MockTts, ScriptedStt, SilenceTurnDetector};
use crate::{
    EngineError, LanguageModel, LlmConfig, Result, SpeechToText, SttConfig, TextToSpeech,
    TtsConfig, TurnDetectionConfig, TurnDetector, VadConfig, VoiceActivityDetector,
};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LlmBackendKind {
    Mock,
    Groq,
}

impl FromStr for LlmBackendKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "groq" => Ok(Self::Groq),
            other => Err(EngineError::Unsupported(format!("llm backend '{other}'"))),
        }
    }
}

impl LlmBackendKind {
    /// Whether the backend needs an API key from the environment.
    pub fn requires_api_key(self) -> bool {
        matches!(self, Self::Groq)
    }
}

pub fn new_llm_backend(
    kind: LlmBackendKind,
    cfg: LlmConfig,
    api_key: Option<String>,
) -> Result<Arc<dyn LanguageModel>> {
    match kind {
        LlmBackendKind::Mock => {
            #[cfg(feature = "mock")]
            {
                let _ = (cfg, api_key);
                Ok(Arc::new(MockLlm::new(
                    "I can help with travel in Toronto, ask me about the weather or things to do",
                )))
            }
            #[cfg(not(feature = "mock"))]
            {
                let _ = (cfg, api_key);
                Err(EngineError::Unsupported("mock feature not enabled".into()))
            }
        }
        LlmBackendKind::Groq => {
            #[cfg(feature = "groq-http")]
            {
                let key = api_key
                    .ok_or_else(|| EngineError::Backend("groq backend requires an api key".into()))?;
                Ok(Arc::new(GroqLlm::new(cfg, key)?))
            }
            #[cfg(not(feature = "groq-http"))]
            {
                let _ = (cfg, api_key);
                Err(EngineError::Unsupported("groq-http feature not enabled".into()))
            }
        }
    }
}

/// Vendor engines run inside the external agent runtime; only the local
/// stand-ins are built here.
pub fn new_stt_backend(
    cfg: SttConfig,
    script: Vec<String>,
) -> Result<Box<dyn SpeechToText + Send>> {
    match cfg.provider.as_str() {
        #[cfg(feature = "mock")]
        "mock" => Ok(Box::new(ScriptedStt::new(cfg, script))),
        "deepgram" => Err(EngineError::Unsupported("deepgram stt is provided by the agent runtime".into())),
        other => {
            let _ = script;
            Err(EngineError::Unsupported(format!("stt provider '{other}'")))
        }
    }
}

pub fn new_tts_backend(cfg: TtsConfig) -> Result<Box<dyn TextToSpeech + Send>> {
    match cfg.provider.as_str() {
        #[cfg(feature = "mock")]
        "mock" => Ok(Box::new(MockTts::new(cfg))),
        "cartesia" => Err(EngineError::Unsupported("cartesia tts is provided by the agent runtime".into())),
        other => Err(EngineError::Unsupported(format!("tts provider '{other}'"))),
    }
}

pub fn new_vad_backend(cfg: VadConfig) -> Result<Box<dyn VoiceActivityDetector + Send>> {
    match cfg.provider.as_str() {
        #[cfg(feature = "mock")]
        "energy" | "mock" => Ok(Box::new(EnergyVad::new(cfg))),
        "silero" => Err(EngineError::Unsupported("silero vad is provided by the agent runtime".into())),
        other => Err(EngineError::Unsupported(format!("vad provider '{other}'"))),
    }
}

pub fn new_turn_detector(cfg: TurnDetectionConfig) -> Result<Box<dyn TurnDetector + Send>> {
    match cfg.provider.as_str() {
        #[cfg(feature = "mock")]
        "silence" | "mock" => Ok(Box::new(SilenceTurnDetector::new(cfg))),
        "multilingual" => Err(EngineError::Unsupported(
            "multilingual turn detector is provided by the agent runtime".into(),
        )),
        other => Err(EngineError::Unsupported(format!("turn detector '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_names() {
        assert_eq!("Groq".parse::<LlmBackendKind>().unwrap(), LlmBackendKind::Groq);
        assert_eq!("mock".parse::<LlmBackendKind>().unwrap(), LlmBackendKind::Mock);
        assert!("openai".parse::<LlmBackendKind>().is_err());
        assert!(LlmBackendKind::Groq.requires_api_key());
        assert!(!LlmBackendKind::Mock.requires_api_key());
    }

    #[test]
    fn runtime_engines_are_unsupported_locally() {
        assert!(matches!(
            new_tts_backend(TtsConfig::default()),
            Err(EngineError::Unsupported(_))
        ));
        assert!(matches!(
            new_vad_backend(VadConfig::default()),
            Err(EngineError::Unsupported(_))
        ));
        assert!(matches!(
            new_turn_detector(TurnDetectionConfig::default()),
            Err(EngineError::Unsupported(_))
        ));
        assert!(matches!(
            new_stt_backend(SttConfig::default(), Vec::new()),
            Err(EngineError::Unsupported(_))
        ));
    }

    #[test]
    fn mock_engines_build() {
        let tts = new_tts_backend(TtsConfig {
            provider: "mock".into(),
            ..TtsConfig::default()
        });
        assert!(tts.is_ok());
        let vad = new_vad_backend(VadConfig {
            provider: "energy".into(),
            ..VadConfig::default()
        });
        assert!(vad.is_ok());
        let llm = new_llm_backend(LlmBackendKind::Mock, LlmConfig::default(), None).unwrap();
        assert_eq!(llm.model_name(), "mock");
    }
}
