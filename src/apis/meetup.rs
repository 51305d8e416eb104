use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info, instrument, warn};

use crate::app::ports::{ListingSource, PagePort};
use crate::common::constants::{
    LISTING_WAIT_TIMEOUT, MEETUP_ITEM_SELECTOR, MEETUP_LISTING_CAP, MEETUP_SEARCH_URL,
};
use crate::common::dom::{resolve_url, Element};
use crate::common::error::Result;
use crate::common::types::{EventRecord, Source};

pub struct MeetupScraper;

impl Default for MeetupScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl MeetupScraper {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ListingSource for MeetupScraper {
    fn source(&self) -> Source {
        Source::Meetup
    }

    fn search_url(&self, city: &str) -> String {
        Url::parse_with_params(
            MEETUP_SEARCH_URL,
            [("allMeetups", "true"), ("userFreeform", city)],
        )
        .map(String::from)
        .unwrap_or_else(|_| MEETUP_SEARCH_URL.to_string())
    }

    #[instrument(skip(self, page))]
    async fn fetch_listings(&self, page: &mut dyn PagePort, city: &str) -> Result<Vec<EventRecord>> {
        let url = self.search_url(city);
        page.goto(&url).await?;

        if let Err(e) = page
            .wait_for_selector(MEETUP_ITEM_SELECTOR, LISTING_WAIT_TIMEOUT)
            .await
        {
            warn!(url = %url, error = %e, "No Meetup listings found");
            return Ok(Vec::new());
        }

        let items = page.query_selector_all(MEETUP_ITEM_SELECTOR).await?;
        let base = page.url().unwrap_or(url.as_str()).to_string();
        let events = parse_items(&items, &base);

        info!("Successfully fetched {} events from Meetup", events.len());
        Ok(events)
    }
}

/// First `MEETUP_LISTING_CAP` listing items to records. Items lacking a
/// title or a link are dropped.
pub fn parse_items(items: &[Element], base_url: &str) -> Vec<EventRecord> {
    items
        .iter()
        .take(MEETUP_LISTING_CAP)
        .filter_map(|item| match parse_item(item, base_url) {
            Ok(Some(event)) => Some(event),
            Ok(None) => {
                debug!("Skipping Meetup item without title or link");
                None
            }
            Err(e) => {
                debug!(error = %e, "Skipping unparseable Meetup item");
                None
            }
        })
        .collect()
}

fn parse_item(item: &Element, base_url: &str) -> Result<Option<EventRecord>> {
    let name = item
        .query_selector("h3")?
        .map(|h3| h3.inner_text().trim().to_string())
        .filter(|name| !name.is_empty());
    let url = item
        .query_selector("a")?
        .and_then(|a| a.attr("href").and_then(|href| resolve_url(base_url, href)));
    let date = item
        .query_selector("time")?
        .and_then(|time| time.attr("datetime").map(str::to_string));

    let (Some(name), Some(url)) = (name, url) else {
        return Ok(None);
    };

    let mut event = EventRecord::listing(Source::Meetup, name, url);
    event.date = date;
    Ok(Some(event))
}
