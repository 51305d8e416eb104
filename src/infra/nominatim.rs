use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::StatusCode;
use tracing::{debug, instrument};

use crate::app::ports::GeocoderPort;
use crate::common::error::{Result, ScraperError};
use crate::common::types::Place;
use crate::config::Config;

/// Geocoder backed by a Nominatim `/search` endpoint
pub struct NominatimGeocoder {
    client: reqwest::Client,
    search_url: String,
    user_agent: String,
}

impl NominatimGeocoder {
    pub fn new(
        search_url: impl Into<String>,
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            search_url: search_url.into(),
            user_agent: user_agent.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.nominatim_url.clone(),
            config.user_agent.clone(),
            config.http_timeout(),
        )
    }
}

#[async_trait]
impl GeocoderPort for NominatimGeocoder {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>> {
        let limit = limit.to_string();
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("format", "json"), ("q", query), ("limit", limit.as_str())])
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(ScraperError::Api {
                message: format!("Nominatim search returned status {status}"),
            });
        }

        let places: Vec<Place> = response.json().await?;
        debug!("Nominatim returned {} places", places.len());
        Ok(places)
    }
}
