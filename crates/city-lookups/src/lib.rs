//! city-lookups: read-only weather and events lookups for a fixed city
//!
//! Each provider sits behind an async trait so the intent router can hold it
//! as `Arc<dyn ...>`. Every failure is a [`RetrievalError`], which callers
//! treat as recoverable.

mod error;
pub use error::{Result, RetrievalError};

mod types;
pub use types::{events_sentence, EventListing, Location, WeatherReport};

mod traits;
pub use traits::{EventsProvider, WeatherProvider};

mod openweather;
pub use openweather::{parse_current_weather, OpenWeatherClient, WeatherSettings, OPENWEATHER_BASE_URL};

mod events;
pub use events::UnconfiguredEvents;

#[cfg(feature = "mock")]
pub mod mock;
