//! Source endpoints, selectors and limits shared by the fetchers.

use std::time::Duration;

// Source tags as they appear in serialized records
pub const EVENTBRITE_SOURCE: &str = "Eventbrite";
pub const MEETUP_SOURCE: &str = "Meetup";
pub const YELP_SOURCE: &str = "Yelp";
pub const OSM_SOURCE: &str = "OSM";

// Eventbrite
pub const EVENTBRITE_BASE_URL: &str = "https://www.eventbrite.com";
pub const EVENTBRITE_CARD_SELECTOR: &str = "a.event-card-link";
pub const EVENTBRITE_DESCRIPTION_SELECTOR: &str = "div.has-user-generated-content.event-description";
pub const EVENTBRITE_ADDRESS_SELECTOR: &str = "div.location-info__address";
pub const EVENTBRITE_LOCATION_ATTR: &str = "data-event-location";

// Meetup
pub const MEETUP_SEARCH_URL: &str = "https://www.meetup.com/find/events/";
pub const MEETUP_ITEM_SELECTOR: &str = "li.event-listing-container-li";
pub const MEETUP_LISTING_CAP: usize = 10;

// Yelp
pub const YELP_SEARCH_URL: &str = "https://www.yelp.com/search";

// OpenStreetMap
pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const OSM_BROWSE_URL: &str = "https://www.openstreetmap.org";
pub const PARKS_RESULT_LIMIT: usize = 10;

/// Nominatim's usage policy requires an identifying client.
pub const DEFAULT_USER_AGENT: &str = "scraper-agent/1.0";

pub const LISTING_WAIT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DETAIL_WAIT_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_DETAIL_LIMIT: usize = 5;
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

pub const FALLBACK_COORDINATE: &str = "0.0";
