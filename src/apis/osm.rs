use tracing::{debug, info, instrument, warn};

use crate::app::ports::GeocoderPort;
use crate::common::constants::{OSM_BROWSE_URL, PARKS_RESULT_LIMIT};
use crate::common::types::{EventRecord, Place, Source};

/// Parks near `city` as records tagged `OSM`. Lookup failures yield an
/// empty list.
#[instrument(skip(geocoder))]
pub async fn fetch_parks(geocoder: &dyn GeocoderPort, city: &str) -> Vec<EventRecord> {
    let places = match geocoder.search(&format!("park {city}"), PARKS_RESULT_LIMIT).await {
        Ok(places) => places,
        Err(e) => {
            warn!(error = %e, "Park search failed");
            return Vec::new();
        }
    };

    let parks: Vec<EventRecord> = places.iter().filter_map(park_record).collect();
    info!("Found {} parks near {}", parks.len(), city);
    parks
}

fn park_record(place: &Place) -> Option<EventRecord> {
    let name = place.display_name.as_deref().filter(|n| !n.is_empty())?;
    let (Some(osm_type), Some(osm_id)) = (place.osm_type.as_deref(), place.osm_id) else {
        debug!(name = %name, "Skipping place without an OSM reference");
        return None;
    };

    let mut record = EventRecord::listing(
        Source::Osm,
        name,
        format!("{OSM_BROWSE_URL}/{osm_type}/{osm_id}"),
    );
    record.lat = place.lat.clone();
    record.lon = place.lon.clone();
    Some(record)
}
