use async_trait::async_trait;
use reqwest::Url;
use tracing::{instrument, warn};

use crate::app::ports::{ListingSource, PagePort};
use crate::common::constants::YELP_SEARCH_URL;
use crate::common::error::Result;
use crate::common::types::{EventRecord, Source};

/// Yelp event search. Listing extraction is not implemented: the page is
/// visited and no events are returned.
pub struct YelpScraper;

impl Default for YelpScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl YelpScraper {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ListingSource for YelpScraper {
    fn source(&self) -> Source {
        Source::Yelp
    }

    fn search_url(&self, city: &str) -> String {
        Url::parse_with_params(YELP_SEARCH_URL, [("find_desc", "events"), ("find_loc", city)])
            .map(String::from)
            .unwrap_or_else(|_| YELP_SEARCH_URL.to_string())
    }

    #[instrument(skip(self, page))]
    async fn fetch_listings(&self, page: &mut dyn PagePort, city: &str) -> Result<Vec<EventRecord>> {
        let url = self.search_url(city);
        page.goto(&url).await?;
        // TODO: extract listings once Yelp's client-rendered result markup is mapped
        warn!(url = %url, "Yelp listing extraction is not implemented, returning no events");
        Ok(Vec::new())
    }
}
