//! Turn handler: classify, dispatch, recover

use crate::{
    EventsHandler, FallbackError, FallbackResponder, Intent, IntentClassifier, IntentHandler,
    RouterConfig, SessionContext, Utterance, WeatherHandler,
};
use city_lookups::{EventsProvider, WeatherProvider};
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::{info, warn};

/// Response produced for one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedReply {
    pub intent: Intent,
    pub text: String,
    /// A handler failed and `text` is the apology
    pub recovered: bool,
}

pub struct IntentRouter {
    config: RouterConfig,
    classifier: IntentClassifier,
    handlers: Vec<Arc<dyn IntentHandler>>,
    fallback: Arc<dyn FallbackResponder>,
}

impl IntentRouter {
    /// Router with no handlers: every utterance goes to `fallback`.
    pub fn new(config: RouterConfig, fallback: Arc<dyn FallbackResponder>) -> Self {
        Self {
            config,
            classifier: IntentClassifier::default(),
            handlers: Vec::new(),
            fallback,
        }
    }

    /// Weather and events handlers for `config.location`.
    pub fn travel_guide(
        config: RouterConfig,
        weather: Arc<dyn WeatherProvider>,
        events: Arc<dyn EventsProvider>,
        fallback: Arc<dyn FallbackResponder>,
    ) -> Self {
        let location = config.location.clone();
        Self::new(config, fallback)
            .with_handler(Arc::new(WeatherHandler::new(weather, location.clone())))
            .with_handler(Arc::new(EventsHandler::new(events, location)))
    }

    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Register a handler, replacing any previous one for the same intent.
    pub fn with_handler(mut self, handler: Arc<dyn IntentHandler>) -> Self {
        self.handlers.retain(|h| h.intent() != handler.intent());
        self.handlers.push(handler);
        self
    }

    pub fn classify(&self, utterance: &Utterance) -> Intent {
        self.classifier.classify(utterance.text())
    }

    pub fn fallback(&self) -> &Arc<dyn FallbackResponder> {
        &self.fallback
    }

    pub fn apology(&self) -> &str {
        &self.config.apology
    }

    pub async fn route(
        &self,
        utterance: &Utterance,
        context: &SessionContext,
    ) -> Result<RoutedReply, FallbackError> {
        if utterance.is_blank() {
            return Ok(self.apologize(Intent::General));
        }

        let intent = self.classify(utterance);
        let queued_ms =
            (OffsetDateTime::now_utc() - utterance.received_at()).whole_milliseconds() as i64;
        info!(session = %context.session_id(), %intent, queued_ms, "routing utterance");

        let handler = self.handlers.iter().find(|h| h.intent() == intent);
        let Some(handler) = handler else {
            let text = self.fallback.respond(utterance, context).await?;
            return Ok(RoutedReply {
                intent,
                text,
                recovered: false,
            });
        };

        match handler.handle(utterance).await {
            Ok(text) => Ok(RoutedReply {
                intent,
                text,
                recovered: false,
            }),
            Err(e) => {
                warn!(session = %context.session_id(), %intent, error = %e, "lookup failed, apologizing");
                Ok(self.apologize(intent))
            }
        }
    }

    fn apologize(&self, intent: Intent) -> RoutedReply {
        RoutedReply {
            intent,
            text: self.config.apology.clone(),
            recovered: true,
        }
    }
}
