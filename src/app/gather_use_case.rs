use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::apis::{create_source, osm};
use crate::app::ports::{BrowserLauncher, GeocoderPort, ListingSource, PagePort};
use crate::common::error::{Result, ScraperError};
use crate::common::types::{Coordinates, EventRecord, Source};

/// Use case for gathering, enriching and geocoding the events of one city
pub struct GatherUseCase {
    geocoder: Arc<dyn GeocoderPort>,
    launcher: Arc<dyn BrowserLauncher>,
    detail_limit: usize,
}

impl GatherUseCase {
    pub fn new(
        geocoder: Arc<dyn GeocoderPort>,
        launcher: Arc<dyn BrowserLauncher>,
        detail_limit: usize,
    ) -> Self {
        Self {
            geocoder,
            launcher,
            detail_limit,
        }
    }

    /// Gather events for `city` from one of the browser-backed sources
    pub async fn gather(&self, city: &str, source: Source) -> Result<Vec<EventRecord>> {
        let listing_source = create_source(source).ok_or_else(|| {
            ScraperError::Config(format!("{source} is not a listing source"))
        })?;
        self.gather_from(listing_source.as_ref(), city).await
    }

    /// One browser session per call; it is closed whether or not collection
    /// succeeds.
    #[instrument(skip(self, source), fields(source = %source.source()))]
    pub async fn gather_from(&self, source: &dyn ListingSource, city: &str) -> Result<Vec<EventRecord>> {
        let default_coordinates = self.geocoder.geocode(city).await;
        debug!(lat = %default_coordinates.lat, lon = %default_coordinates.lon, "City coordinates");

        let mut session = self.launcher.launch().await?;
        let outcome = self
            .collect(session.page(), source, city, &default_coordinates)
            .await;

        if let Err(e) = session.close().await {
            warn!(error = %e, "Failed to close browser session");
        }

        match &outcome {
            Ok(events) => info!("Gathered {} events for {}", events.len(), city),
            Err(e) => warn!(error = %e, "Gathering failed for {}", city),
        }
        outcome
    }

    async fn collect(
        &self,
        page: &mut dyn PagePort,
        source: &dyn ListingSource,
        city: &str,
        default_coordinates: &Coordinates,
    ) -> Result<Vec<EventRecord>> {
        let mut listings = source.fetch_listings(page, city).await?;
        debug!(
            "Fetched {} listings, enriching up to {}",
            listings.len(),
            self.detail_limit
        );

        for (idx, listing) in listings.iter_mut().enumerate() {
            if idx < self.detail_limit {
                match source.fetch_details(page, &listing.url).await {
                    Ok(details) => listing.apply_details(details),
                    Err(e) => {
                        warn!(url = %listing.url, error = %e, "Detail fetch failed, keeping listing fields");
                    }
                }
            }

            let venue = listing
                .venue
                .as_deref()
                .map(str::trim)
                .filter(|venue| !venue.is_empty());
            let coordinates = match venue {
                Some(venue) => self.geocoder.geocode(&format!("{venue}, {city}")).await,
                None => default_coordinates.clone(),
            };
            listing.set_coordinates(coordinates);
        }

        Ok(listings)
    }

    /// Parks near `city` from OpenStreetMap
    pub async fn parks(&self, city: &str) -> Vec<EventRecord> {
        osm::fetch_parks(self.geocoder.as_ref(), city).await
    }
}
