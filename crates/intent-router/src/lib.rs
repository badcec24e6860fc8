//! Intent Router for the travel-guide agent
//!
//! Classifies each user utterance (weather, events, general), dispatches it
//! to the matching handler and falls back to the language model otherwise.
//! Lookup failures turn into a short spoken apology; only a failing
//! fallback is reported to the caller.

mod fallback;
mod handlers;
mod intent;
mod router;
mod utterance;

pub use fallback::{FallbackError, FallbackResponder, LlmFallback};
pub use handlers::{EventsHandler, IntentHandler, WeatherHandler};
pub use intent::{Intent, IntentClassifier, IntentRule};
pub use router::{IntentRouter, RoutedReply};
pub use utterance::{SessionContext, Utterance};

use city_lookups::Location;
use serde::{Deserialize, Serialize};

pub const DEFAULT_APOLOGY: &str =
    "Sorry, I couldn't find that out right now. Could you try asking in a different way?";

/// Configuration for intent routing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Spoken when a lookup fails or the utterance is empty
    pub apology: String,
    /// Place the weather and events handlers answer for
    pub location: Location,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            apology: DEFAULT_APOLOGY.to_string(),
            location: Location::default(),
        }
    }
}

/// Classify text with the default rules
pub fn classify(text: &str) -> Intent {
    IntentClassifier::default().classify(text)
}
