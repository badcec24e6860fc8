use crate::{Intent, Utterance};
use async_trait::async_trait;
use city_lookups::{events_sentence, EventsProvider, Location, RetrievalError, WeatherProvider};
use std::sync::Arc;

/// Answers utterances of one intent. Failures are recoverable.
#[async_trait]
pub trait IntentHandler: Send + Sync {
    fn intent(&self) -> Intent;

    async fn handle(&self, utterance: &Utterance) -> Result<String, RetrievalError>;
}

/// Current conditions for a fixed location.
pub struct WeatherHandler {
    provider: Arc<dyn WeatherProvider>,
    location: Location,
}

impl WeatherHandler {
    pub fn new(provider: Arc<dyn WeatherProvider>, location: Location) -> Self {
        Self { provider, location }
    }
}

#[async_trait]
impl IntentHandler for WeatherHandler {
    fn intent(&self) -> Intent {
        Intent::Weather
    }

    async fn handle(&self, _utterance: &Utterance) -> Result<String, RetrievalError> {
        let report = self.provider.current(&self.location).await?;
        Ok(report.sentence(&self.location))
    }
}

pub struct EventsHandler {
    provider: Arc<dyn EventsProvider>,
    location: Location,
}

impl EventsHandler {
    pub fn new(provider: Arc<dyn EventsProvider>, location: Location) -> Self {
        Self { provider, location }
    }
}

#[async_trait]
impl IntentHandler for EventsHandler {
    fn intent(&self) -> Intent {
        Intent::Events
    }

    async fn handle(&self, _utterance: &Utterance) -> Result<String, RetrievalError> {
        let events = self.provider.upcoming(&self.location).await?;
        events_sentence(&self.location, &events).ok_or_else(|| {
            RetrievalError::Unavailable(format!("{} returned no events", self.provider.name()))
        })
    }
}
