//! City events scraper: gathers listings for a city, enriches them from
//! detail pages and geocodes their venues.

pub mod apis;
pub mod app;
pub mod common;
pub mod config;
pub mod infra;
pub mod observability;
pub mod server;

pub use app::gather_use_case::GatherUseCase;
pub use common::error::{Result, ScraperError};
pub use common::types::{Coordinates, EventRecord, Source};
pub use config::Config;

use std::sync::Arc;

use infra::http_browser::HttpBrowser;
use infra::nominatim::NominatimGeocoder;

/// Wires the HTTP browser and Nominatim geocoder from `config`.
pub fn build_gatherer(config: &Config) -> Result<GatherUseCase> {
    let geocoder = Arc::new(NominatimGeocoder::from_config(config)?);
    let browser = Arc::new(HttpBrowser::from_config(config)?);
    Ok(GatherUseCase::new(geocoder, browser, config.detail_limit))
}
