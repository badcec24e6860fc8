use crate::{EventListing, EventsProvider, Location, Result, RetrievalError};
use async_trait::async_trait;

/// Events source used until a real listings feed is configured. Every lookup
/// fails with [`RetrievalError::Unavailable`], so callers fall back the same
/// way they do for a failed weather lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredEvents;

#[async_trait]
impl EventsProvider for UnconfiguredEvents {
    async fn upcoming(&self, location: &Location) -> Result<Vec<EventListing>> {
        tracing::debug!(location = %location.query(), "events lookup requested with no source configured");
        Err(RetrievalError::Unavailable(
            "no events source configured".to_string(),
        ))
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_unavailable() {
        let err = UnconfiguredEvents
            .upcoming(&Location::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::Unavailable(_)));
    }
}
