use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::constants::{
    EVENTBRITE_SOURCE, FALLBACK_COORDINATE, MEETUP_SOURCE, OSM_SOURCE, YELP_SOURCE,
};
use crate::common::error::ScraperError;

/// Where a record was scraped from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Source {
    #[default]
    Eventbrite,
    Meetup,
    Yelp,
    #[serde(rename = "OSM")]
    Osm,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Eventbrite => EVENTBRITE_SOURCE,
            Source::Meetup => MEETUP_SOURCE,
            Source::Yelp => YELP_SOURCE,
            Source::Osm => OSM_SOURCE,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eventbrite" => Ok(Source::Eventbrite),
            "meetup" => Ok(Source::Meetup),
            "yelp" => Ok(Source::Yelp),
            "osm" => Ok(Source::Osm),
            other => Err(ScraperError::Config(format!("unknown source '{other}'"))),
        }
    }
}

/// A normalized event as returned to callers.
///
/// `url` is always absolute; optional fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub source: Source,
    pub name: String,
    pub url: String,
    pub date: Option<String>,
    pub venue: Option<String>,
    pub description: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

impl EventRecord {
    /// A bare listing as scraped from a search page
    pub fn listing(source: Source, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            source,
            name: name.into(),
            url: url.into(),
            date: None,
            venue: None,
            description: None,
            lat: None,
            lon: None,
        }
    }

    /// Replace description and venue with what the detail page produced.
    /// A detail page without an address clears the card's venue.
    pub fn apply_details(&mut self, details: EventDetails) {
        self.description = details.description;
        self.venue = details.venue;
    }

    pub fn set_coordinates(&mut self, coordinates: Coordinates) {
        self.lat = Some(coordinates.lat);
        self.lon = Some(coordinates.lon);
    }
}

/// Supplementary fields found on an individual listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDetails {
    pub description: Option<String>,
    pub venue: Option<String>,
}

/// Text-encoded latitude/longitude pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub lat: String,
    pub lon: String,
}

impl Coordinates {
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lon: lon.into(),
        }
    }

    /// Returned whenever a lookup fails or finds nothing
    pub fn fallback() -> Self {
        Self::new(FALLBACK_COORDINATE, FALLBACK_COORDINATE)
    }

    pub fn is_fallback(&self) -> bool {
        self.lat == FALLBACK_COORDINATE && self.lon == FALLBACK_COORDINATE
    }
}

/// One geocoding search hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lon: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub osm_type: Option<String>,
    #[serde(default)]
    pub osm_id: Option<u64>,
}

impl Place {
    /// Coordinates when both values are present and non-empty
    pub fn coordinates(&self) -> Option<Coordinates> {
        let lat = self.lat.as_deref().filter(|s| !s.is_empty())?;
        let lon = self.lon.as_deref().filter(|s| !s.is_empty())?;
        Some(Coordinates::new(lat, lon))
    }
}
