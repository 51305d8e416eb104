use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::common::dom::Element;
use crate::common::error::Result;
use crate::common::types::{Coordinates, EventDetails, EventRecord, Place, Source};

// Geocoding port
#[async_trait]
pub trait GeocoderPort: Send + Sync {
    /// Raw place search; fails on transport errors and non-200 responses.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>>;

    /// Best single match for `query`, or the zero fallback. Never fails.
    async fn geocode(&self, query: &str) -> Coordinates {
        match self.search(query, 1).await {
            Ok(places) => match places.first().and_then(Place::coordinates) {
                Some(coordinates) => coordinates,
                None => {
                    debug!(query = %query, "Geocoder returned no usable result");
                    Coordinates::fallback()
                }
            },
            Err(e) => {
                warn!(query = %query, error = %e, "Geocoding failed, using fallback coordinates");
                Coordinates::fallback()
            }
        }
    }
}

// Browser ports
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

/// One browser process with a single reusable page.
#[async_trait]
pub trait BrowserSession: Send {
    fn page(&mut self) -> &mut dyn PagePort;

    async fn close(self: Box<Self>) -> Result<()>;
}

#[async_trait]
pub trait PagePort: Send + Sync {
    async fn goto(&mut self, url: &str) -> Result<()>;

    /// Resolves once `selector` matches, or fails with `ScraperError::Timeout`.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>>;

    async fn query_selector(&self, selector: &str) -> Result<Option<Element>> {
        Ok(self.query_selector_all(selector).await?.into_iter().next())
    }

    fn url(&self) -> Option<&str>;
}

/// A site that lists events for a city
#[async_trait]
pub trait ListingSource: Send + Sync {
    fn source(&self) -> Source;

    fn search_url(&self, city: &str) -> String;

    async fn fetch_listings(&self, page: &mut dyn PagePort, city: &str) -> Result<Vec<EventRecord>>;

    /// Sources without detail pages report nothing to merge.
    async fn fetch_details(&self, _page: &mut dyn PagePort, _url: &str) -> Result<EventDetails> {
        Ok(EventDetails::default())
    }
}
