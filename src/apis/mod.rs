//! Listing sources and the OpenStreetMap parks lookup.

pub mod eventbrite;
pub mod meetup;
pub mod osm;
pub mod yelp;

use crate::app::ports::ListingSource;
use crate::common::types::Source;

use self::eventbrite::EventbriteScraper;
use self::meetup::MeetupScraper;
use self::yelp::YelpScraper;

/// Browser-backed scraper for `source`; `None` for sources queried over an API.
pub fn create_source(source: Source) -> Option<Box<dyn ListingSource>> {
    match source {
        Source::Eventbrite => Some(Box::new(EventbriteScraper::new())),
        Source::Meetup => Some(Box::new(MeetupScraper::new())),
        Source::Yelp => Some(Box::new(YelpScraper::new())),
        Source::Osm => None,
    }
}

/// Sources accepted by `gather`
pub fn listing_sources() -> Vec<Source> {
    vec![Source::Eventbrite, Source::Meetup, Source::Yelp]
}
