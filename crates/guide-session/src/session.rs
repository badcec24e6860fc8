//! Conversation session: greeting, one turn at a time, farewell

use crate::{AgentConfiguration, SessionError, VoicePipeline};
use intent_router::{Intent, IntentRouter, SessionContext, Utterance};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{info, warn};
use voice_engines::{PipelineSpec, TextToSpeech};

/// What the agent says back for one turn
#[derive(Debug, Clone, PartialEq)]
pub struct SpokenReply {
    /// `None` for agent-initiated speech (greeting, farewell)
    pub intent: Option<Intent>,
    pub text: String,
    /// Synthesized S16LE audio; empty without a TTS engine
    pub audio: Vec<i16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub turns: usize,
    pub recovered: usize,
    pub interrupted: bool,
}

pub struct AgentSession {
    agent: Arc<AgentConfiguration>,
    router: Arc<IntentRouter>,
    context: SessionContext,
    tts: Option<Box<dyn TextToSpeech + Send>>,
    pipeline: Option<VoicePipeline>,
    recovered: usize,
}

impl AgentSession {
    pub fn new(
        agent: Arc<AgentConfiguration>,
        router: Arc<IntentRouter>,
        context: SessionContext,
    ) -> Self {
        Self {
            agent,
            router,
            context,
            tts: None,
            pipeline: None,
            recovered: 0,
        }
    }

    pub fn with_tts(mut self, tts: Box<dyn TextToSpeech + Send>) -> Self {
        self.tts = Some(tts);
        self
    }

    pub fn with_pipeline(mut self, pipeline: VoicePipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn start(&self, engines: &PipelineSpec) {
        info!(
            session = %self.context.session_id(),
            stt = %engines.stt.provider,
            llm = %engines.llm.model,
            tts = %engines.tts.provider,
            vad = %engines.vad.provider,
            turn_detection = %engines.turn_detection.provider,
            "session started"
        );
    }

    /// Agent-initiated reply from one-off instructions.
    pub async fn generate_reply(&mut self, instructions: &str) -> Result<SpokenReply, SessionError> {
        let text = self
            .router
            .fallback()
            .generate_reply(instructions, &self.context)
            .await?;
        self.context.record_assistant(&text);
        Ok(self.speak(None, text))
    }

    pub async fn greet(&mut self) -> Result<SpokenReply, SessionError> {
        let instructions = self.agent.greeting_instructions.clone();
        self.generate_reply(&instructions).await
    }

    pub async fn handle_utterance(
        &mut self,
        utterance: &Utterance,
    ) -> Result<SpokenReply, SessionError> {
        let reply = self.router.route(utterance, &self.context).await?;
        if reply.recovered {
            self.recovered += 1;
        }
        self.context.record_turn(utterance.text(), &reply.text);
        Ok(self.speak(Some(reply.intent), reply.text))
    }

    /// Feed microphone audio; answers when the pipeline closes a turn.
    pub async fn handle_audio(&mut self, frame: &[i16]) -> Result<Option<SpokenReply>, SessionError> {
        let utterance = match self.pipeline.as_mut() {
            Some(pipeline) => pipeline.push_frame(frame),
            None => None,
        };
        match utterance {
            Some(utterance) => self.handle_utterance(&utterance).await.map(Some),
            None => Ok(None),
        }
    }

    pub fn farewell(&mut self) -> SpokenReply {
        let text = self.agent.farewell.clone();
        self.speak(None, text)
    }

    /// Line-oriented conversation loop. Stops at end of input or when
    /// `shutdown` turns true; a greeting or turn in flight at teardown is
    /// dropped unanswered.
    pub async fn run<R, W>(
        &mut self,
        input: R,
        output: &mut W,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<SessionSummary, SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut summary = SessionSummary {
            turns: 0,
            recovered: 0,
            interrupted: false,
        };

        let greeting = tokio::select! {
            biased;
            _ = teardown(&mut shutdown) => {
                info!(session = %self.context.session_id(), "teardown during greeting");
                summary.interrupted = true;
                None
            }
            greeting = self.greet() => Some(greeting),
        };
        match greeting {
            Some(Ok(greeting)) => write_line(output, &greeting.text).await?,
            Some(Err(e)) => warn!(error = %e, "greeting failed"),
            None => {}
        }

        let mut lines = input.lines();
        while !summary.interrupted {
            let line = tokio::select! {
                biased;
                _ = teardown(&mut shutdown) => {
                    summary.interrupted = true;
                    break;
                }
                line = lines.next_line() => line?,
            };
            let Some(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }

            let utterance = Utterance::new(line);
            let result = tokio::select! {
                biased;
                _ = teardown(&mut shutdown) => {
                    info!(session = %self.context.session_id(), "teardown during turn, abandoning it");
                    summary.interrupted = true;
                    break;
                }
                result = self.handle_utterance(&utterance) => result,
            };

            let text = match result {
                Ok(reply) => reply.text,
                Err(SessionError::Fallback(e)) => {
                    warn!(session = %self.context.session_id(), error = %e, "fallback failed");
                    self.recovered += 1;
                    self.router.apology().to_string()
                }
                Err(e) => return Err(e),
            };
            write_line(output, &text).await?;
            summary.turns += 1;
        }

        let bye = self.farewell();
        write_line(output, &bye.text).await?;
        output.flush().await?;
        summary.recovered = self.recovered;
        info!(
            session = %self.context.session_id(),
            turns = summary.turns,
            recovered = summary.recovered,
            "session ended"
        );
        Ok(summary)
    }

    fn speak(&mut self, intent: Option<Intent>, text: String) -> SpokenReply {
        let audio = self
            .tts
            .as_mut()
            .map(|tts| tts.synthesize(&text))
            .unwrap_or_default();
        SpokenReply {
            intent,
            text,
            audio,
        }
    }
}

/// Resolves once the flag is true; pends forever if the sender is gone.
async fn teardown(shutdown: &mut watch::Receiver<bool>) {
    while !*shutdown.borrow_and_update() {
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use city_lookups::mock::{FailingWeather, StaticWeather};
    use city_lookups::{Location, RetrievalError, UnconfiguredEvents, WeatherProvider, WeatherReport};
    use intent_router::{LlmFallback, RouterConfig};
    use std::time::Duration;
    use voice_engines::{
        ChatMessage, EnergyVad, LanguageModel, MockLlm, MockTts, ScriptedStt, SilenceTurnDetector, SttConfig, TtsConfig,
        TurnDetectionConfig, VadConfig,
    };

    struct StallingWeather;

    #[async_trait]
    impl WeatherProvider for StallingWeather {
        async fn current(&self, _location: &Location) -> Result<WeatherReport, RetrievalError> {
            std::future::pending().await
        }

        fn name(&self) -> &str {
            "stalling"
        }
    }

    struct StallingLlm;

    #[async_trait]
    impl LanguageModel for StallingLlm {
        async fn generate(&self, _messages: &[ChatMessage]) -> voice_engines::Result<String> {
            std::future::pending().await
        }

        fn model_name(&self) -> &str {
            "stalling"
        }
    }

    fn session_with(weather: Arc<dyn WeatherProvider>, llm: Arc<dyn LanguageModel>) -> AgentSession {
        let agent = Arc::new(AgentConfiguration::default());
        let fallback = Arc::new(LlmFallback::new(llm, agent.instructions.clone()));
        let router = IntentRouter::travel_guide(
            RouterConfig::default(),
            weather,
            Arc::new(UnconfiguredEvents),
            fallback,
        );
        AgentSession::new(agent, Arc::new(router), SessionContext::default())
    }

    fn greeting_llm() -> Arc<MockLlm> {
        Arc::new(MockLlm::new("Try the Distillery District").with_replies(vec![
            "Hi, welcome to Toronto, what can I help with".to_string(),
        ]))
    }

    #[tokio::test]
    async fn console_conversation() {
        let llm = greeting_llm();
        let mut session = session_with(Arc::new(StaticWeather::new(5.0, "light rain")), llm.clone());
        let (_tx, rx) = watch::channel(false);
        let input: &[u8] = b"What's the weather like today?\n\n   \nAny events happening this weekend?\nWhere should I go tonight?\n";
        let mut output = Vec::new();

        let summary = session.run(input, &mut output, rx).await.unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Hi, welcome to Toronto, what can I help with",
                "The current weather in Toronto is 5.0 degrees Celsius with light rain.",
                RouterConfig::default().apology.as_str(),
                "Try the Distillery District",
                "Thanks for chatting! Enjoy your time in Toronto.",
            ]
        );
        assert_eq!(
            summary,
            SessionSummary {
                turns: 3,
                recovered: 1,
                interrupted: false
            }
        );
        // greeting + one general turn
        assert_eq!(llm.call_count(), 2);
        // greeting followed by three recorded turns
        assert_eq!(session.context().history().len(), 7);
    }

    #[tokio::test]
    async fn teardown_abandons_inflight_lookup() {
        let mut session = session_with(Arc::new(StallingWeather), greeting_llm());
        let (tx, rx) = watch::channel(false);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = tx.send(true);
        });
        let input: &[u8] = b"weather?\nnever answered\n";
        let mut output = Vec::new();

        let summary = session.run(input, &mut output, rx).await.unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.turns, 0);
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with("Thanks for chatting! Enjoy your time in Toronto.\n"));
    }

    #[tokio::test]
    async fn teardown_abandons_stalled_greeting() {
        let mut session = session_with(Arc::new(StaticWeather::new(5.0, "light rain")), Arc::new(StallingLlm));
        let (_tx, rx) = watch::channel(true);
        let input: &[u8] = b"weather?\n";
        let mut output = Vec::new();

        let summary = tokio::time::timeout(Duration::from_secs(1), session.run(input, &mut output, rx))
            .await
            .unwrap()
            .unwrap();
        assert!(summary.interrupted);
        assert_eq!(summary.turns, 0);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Thanks for chatting! Enjoy your time in Toronto.\n"
        );
        assert!(session.context().history().is_empty());
    }

    #[tokio::test]
    async fn fallback_failure_keeps_session_alive() {
        let mut session = session_with(
            Arc::new(FailingWeather::with_body("{}")),
            Arc::new(MockLlm::failing()),
        );
        let (_tx, rx) = watch::channel(false);
        let input: &[u8] = b"hello\nweather\n";
        let mut output = Vec::new();

        let summary = session.run(input, &mut output, rx).await.unwrap();
        let apology = RouterConfig::default().apology;
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // no greeting, two apologies, farewell
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], apology);
        assert_eq!(lines[1], apology);
        assert_eq!(summary.recovered, 2);
    }

    #[tokio::test]
    async fn handle_utterance_propagates_fallback_error() {
        let mut session = session_with(
            Arc::new(StaticWeather::new(1.0, "fog")),
            Arc::new(MockLlm::failing()),
        );
        let err = session
            .handle_utterance(&Utterance::new("best poutine?"))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Fallback(_)));
    }

    #[tokio::test]
    async fn audio_turn_is_answered_with_speech() {
        let pipeline = VoicePipeline::new(
            Box::new(ScriptedStt::new(
                SttConfig::default(),
                vec!["how is the weather?".to_string()],
            )),
            Box::new(EnergyVad::new(VadConfig::default())),
            Box::new(SilenceTurnDetector::new(TurnDetectionConfig::default())),
            16_000,
        );
        let mut session = session_with(Arc::new(StaticWeather::new(-4.5, "snow")), greeting_llm())
            .with_pipeline(pipeline)
            .with_tts(Box::new(MockTts::new(TtsConfig::default())));

        let loud = vec![4000_i16; 320];
        let quiet = vec![0_i16; 320];
        assert!(session.handle_audio(&loud).await.unwrap().is_none());
        assert!(session.handle_audio(&loud).await.unwrap().is_none());

        let mut reply = None;
        for _ in 0..40 {
            if let Some(r) = session.handle_audio(&quiet).await.unwrap() {
                reply = Some(r);
                break;
            }
        }
        let reply = reply.unwrap();
        assert_eq!(reply.intent, Some(Intent::Weather));
        assert_eq!(
            reply.text,
            "The current weather in Toronto is -4.5 degrees Celsius with snow."
        );
        assert!(!reply.audio.is_empty());
    }

    #[tokio::test]
    async fn farewell_uses_configuration() {
        let mut session = session_with(Arc::new(StaticWeather::new(1.0, "fog")), greeting_llm());
        let bye = session.farewell();
        assert_eq!(bye.intent, None);
        assert_eq!(bye.text, AgentConfiguration::default().farewell);
        assert!(bye.audio.is_empty());
    }
}
