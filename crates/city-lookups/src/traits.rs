use crate::{EventListing, Location, Result, WeatherReport};
use async_trait::async_trait;

/// Current-conditions lookup. Implementations are read-only, so dropping an
/// in-flight call has no side effects.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(&self, location: &Location) -> Result<WeatherReport>;

    fn name(&self) -> &str;
}

#[async_trait]
pub trait EventsProvider: Send + Sync {
    async fn upcoming(&self, location: &Location) -> Result<Vec<EventListing>>;

    fn name(&self) -> &str;
}
