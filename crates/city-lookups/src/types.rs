use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub city: String,
    /// ISO 3166 country code
    pub country: String,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            city: "Toronto".to_string(),
            country: "CA".to_string(),
        }
    }
}

impl Location {
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
        }
    }

    /// Provider query form, e.g. `Toronto,CA`.
    pub fn query(&self) -> String {
        format!("{},{}", self.city, self.country)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature_celsius: f64,
    pub description: String,
}

impl WeatherReport {
    pub fn sentence(&self, location: &Location) -> String {
        format!(
            "The current weather in {} is {} degrees Celsius with {}.",
            location.city,
            format_temperature(self.temperature_celsius),
            self.description
        )
    }
}

/// Whole values keep one decimal (`5.0`); others print as reported (`21.37`).
/// Temperatures are always `f64`, so an integer `main.temp` such as `-2`
/// also renders as `-2.0`.
fn format_temperature(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventListing {
    pub name: String,
    pub venue: Option<String>,
    pub starts_at: Option<String>,
}

impl EventListing {
    fn phrase(&self) -> String {
        let mut out = self.name.clone();
        if let Some(venue) = &self.venue {
            out.push_str(" at ");
            out.push_str(venue);
        }
        if let Some(when) = &self.starts_at {
            out.push_str(" on ");
            out.push_str(when);
        }
        out
    }
}

/// Render listings as one spoken sentence; `None` when there is nothing to say.
pub fn events_sentence(location: &Location, events: &[EventListing]) -> Option<String> {
    let phrases: Vec<String> = events.iter().map(EventListing::phrase).collect();
    match phrases.as_slice() {
        [] => None,
        [only] => Some(format!("Coming up in {} there is {only}.", location.city)),
        [init @ .., last] => Some(format!(
            "Coming up in {} there is {} and {last}.",
            location.city,
            init.join(", ")
        )),
    }
}
