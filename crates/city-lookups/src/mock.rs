//! In-memory providers for development and testing

use crate::{EventListing, EventsProvider, Location, Result, RetrievalError, WeatherProvider, WeatherReport};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Weather provider returning a fixed report.
pub struct StaticWeather {
    report: WeatherReport,
    calls: AtomicUsize,
    last_query: Mutex<Option<String>>,
}

impl StaticWeather {
    pub fn new(temperature_celsius: f64, description: impl Into<String>) -> Self {
        Self {
            report: WeatherReport {
                temperature_celsius,
                description: description.into(),
            },
            calls: AtomicUsize::new(0),
            last_query: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `city,country` of the most recent lookup.
    pub fn last_query(&self) -> Option<String> {
        self.last_query.lock().ok().and_then(|q| q.clone())
    }
}

#[async_trait]
impl WeatherProvider for StaticWeather {
    async fn current(&self, location: &Location) -> Result<WeatherReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_query.lock() {
            *last = Some(location.query());
        }
        Ok(self.report.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Weather provider that always fails: a canned body that does not parse
/// yields `Malformed`, one that parses simulates an outage.
pub struct FailingWeather {
    body: String,
    calls: AtomicUsize,
}

impl FailingWeather {
    /// Fails as if the provider answered with `body`.
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherProvider for FailingWeather {
    async fn current(&self, _location: &Location) -> Result<WeatherReport> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        crate::parse_current_weather(&self.body)?;
        Err(RetrievalError::Network("simulated provider outage".into()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

pub struct StaticEvents {
    events: Vec<EventListing>,
    calls: AtomicUsize,
}

impl StaticEvents {
    pub fn new(events: Vec<EventListing>) -> Self {
        Self {
            events,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventsProvider for StaticEvents {
    async fn upcoming(&self, _location: &Location) -> Result<Vec<EventListing>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.events.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}
