use std::collections::HashSet;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use crate::app::ports::{ListingSource, PagePort};
use crate::common::constants::{
    DETAIL_WAIT_TIMEOUT, EVENTBRITE_ADDRESS_SELECTOR, EVENTBRITE_CARD_SELECTOR,
    EVENTBRITE_BASE_URL, EVENTBRITE_DESCRIPTION_SELECTOR, EVENTBRITE_LOCATION_ATTR,
    LISTING_WAIT_TIMEOUT,
};
use crate::common::dom::{resolve_url, Element};
use crate::common::error::Result;
use crate::common::types::{EventDetails, EventRecord, Source};

pub struct EventbriteScraper {
    base_url: String,
}

impl Default for EventbriteScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl EventbriteScraper {
    pub fn new() -> Self {
        Self::with_base_url(EVENTBRITE_BASE_URL)
    }

    /// Point the scraper at another host serving Eventbrite markup
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// "San Francisco " -> "san-francisco"
pub fn city_slug(city: &str) -> String {
    city.trim().to_lowercase().replace(' ', "-")
}

#[async_trait]
impl ListingSource for EventbriteScraper {
    fn source(&self) -> Source {
        Source::Eventbrite
    }

    fn search_url(&self, city: &str) -> String {
        format!("{}/d/{}/all-events/", self.base_url, city_slug(city))
    }

    #[instrument(skip(self, page))]
    async fn fetch_listings(&self, page: &mut dyn PagePort, city: &str) -> Result<Vec<EventRecord>> {
        let url = self.search_url(city);
        page.goto(&url).await?;

        if let Err(e) = page
            .wait_for_selector(EVENTBRITE_CARD_SELECTOR, LISTING_WAIT_TIMEOUT)
            .await
        {
            warn!(url = %url, error = %e, "No Eventbrite event cards found");
            return Ok(Vec::new());
        }

        let cards = page.query_selector_all(EVENTBRITE_CARD_SELECTOR).await?;
        let base = page.url().unwrap_or(url.as_str()).to_string();
        let events = parse_cards(&cards, &base);

        info!(
            "Successfully fetched {} events from Eventbrite ({} cards)",
            events.len(),
            cards.len()
        );
        Ok(events)
    }

    #[instrument(skip(self, page))]
    async fn fetch_details(&self, page: &mut dyn PagePort, url: &str) -> Result<EventDetails> {
        page.goto(url).await?;
        let mut details = EventDetails::default();

        match page
            .wait_for_selector(EVENTBRITE_DESCRIPTION_SELECTOR, DETAIL_WAIT_TIMEOUT)
            .await
        {
            Ok(()) => match page.query_selector(EVENTBRITE_DESCRIPTION_SELECTOR).await {
                Ok(Some(el)) => details.description = Some(el.inner_text().trim().to_string()),
                Ok(None) => {}
                Err(e) => debug!(error = %e, "Description lookup failed"),
            },
            Err(e) => debug!(error = %e, "No description on detail page"),
        }

        match page.query_selector(EVENTBRITE_ADDRESS_SELECTOR).await {
            Ok(Some(el)) => details.venue = Some(pick_address_line(el.inner_text())),
            Ok(None) => debug!("No address block on detail page"),
            Err(e) => debug!(error = %e, "Address lookup failed"),
        }

        Ok(details)
    }
}

/// Event cards to records, skipping cards without an href and cards whose
/// resolved URL was already seen in this batch.
pub fn parse_cards(cards: &[Element], base_url: &str) -> Vec<EventRecord> {
    let mut seen = HashSet::new();
    let mut events = Vec::new();

    for card in cards {
        let href = match card.attr("href").map(str::trim) {
            Some(href) if !href.is_empty() => href,
            _ => continue,
        };
        let Some(url) = resolve_url(base_url, href) else {
            debug!(href = %href, "Skipping card with unusable href");
            continue;
        };
        if !seen.insert(url.clone()) {
            continue;
        }

        let name = card
            .attr("aria-label")
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| card.inner_text())
            .trim()
            .to_string();

        let mut event = EventRecord::listing(Source::Eventbrite, name, url);
        event.venue = card
            .attr(EVENTBRITE_LOCATION_ATTR)
            .map(|venue| venue.trim().to_string());
        events.push(event);
    }

    events
}

/// Picks the street-address line out of an address block: the first line
/// with a digit, else the last line, else the raw text. "Show map" lines
/// are ignored.
pub fn pick_address_line(raw: &str) -> String {
    let raw = raw.trim();
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.to_lowercase().starts_with("show map"))
        .collect();

    lines
        .iter()
        .find(|line| line.chars().any(|c| c.is_ascii_digit()))
        .or_else(|| lines.last())
        .map(|line| line.to_string())
        .unwrap_or_else(|| raw.to_string())
}
