mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{header::USER_AGENT, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use city_events::apis::eventbrite::EventbriteScraper;
use city_events::app::ports::{BrowserLauncher, GeocoderPort, PagePort};
use city_events::infra::http_browser::HttpBrowser;
use city_events::infra::nominatim::NominatimGeocoder;
use city_events::{Coordinates, GatherUseCase, ScraperError};
use common::spawn_stub;

const TEST_AGENT: &str = "city-events-test/1.0";

type Seen = Arc<Mutex<Vec<(HashMap<String, String>, Option<String>)>>>;

async fn nominatim(
    State(seen): State<Seen>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let query = params.get("q").cloned().unwrap_or_default();
    seen.lock().unwrap().push((params, agent));

    match query.as_str() {
        "Austin" => Json(json!([
            {"lat": "30.2711286", "lon": "-97.7436995", "display_name": "Austin, Travis County, Texas", "osm_type": "relation", "osm_id": 113314}
        ]))
        .into_response(),
        "604 Brazos St, Austin" => Json(json!([
            {"lat": "30.2682", "lon": "-97.7420", "display_name": "Driskill Hotel"}
        ]))
        .into_response(),
        "No Coordinates" => Json(json!([{"lat": "", "lon": "", "display_name": "?"}])).into_response(),
        "Broken" => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        "Garbage" => "not json".into_response(),
        _ => Json(json!([])).into_response(),
    }
}

fn geocoder_stub() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/search", get(nominatim))
        .with_state(seen.clone());
    (spawn_stub(router), seen)
}

fn geocoder(base: &str) -> NominatimGeocoder {
    NominatimGeocoder::new(format!("{base}/search"), TEST_AGENT, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_geocode_sends_expected_request() {
    let (base, seen) = geocoder_stub();

    let coordinates = geocoder(&base).geocode("Austin").await;

    assert_eq!(coordinates, Coordinates::new("30.2711286", "-97.7436995"));
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (params, agent) = &seen[0];
    assert_eq!(params.get("format").map(String::as_str), Some("json"));
    assert_eq!(params.get("q").map(String::as_str), Some("Austin"));
    assert_eq!(params.get("limit").map(String::as_str), Some("1"));
    assert_eq!(agent.as_deref(), Some(TEST_AGENT));
}

#[tokio::test]
async fn test_geocode_falls_back_on_every_failure() {
    let (base, _) = geocoder_stub();
    let geocoder = geocoder(&base);

    for query in ["Nowhere", "No Coordinates", "Broken", "Garbage"] {
        let coordinates = geocoder.geocode(query).await;
        assert!(coordinates.is_fallback(), "{query} should fall back");
    }

    let unreachable =
        NominatimGeocoder::new("http://127.0.0.1:1/search", TEST_AGENT, Duration::from_secs(2)).unwrap();
    assert_eq!(unreachable.geocode("Austin").await, Coordinates::fallback());
}

#[tokio::test]
async fn test_search_reports_non_200_as_api_error() {
    let (base, seen) = geocoder_stub();
    let geocoder = geocoder(&base);

    let err = geocoder.search("Broken", 10).await.unwrap_err();
    assert!(matches!(err, ScraperError::Api { .. }));

    let places = geocoder.search("Austin", 10).await.unwrap();
    assert_eq!(places[0].osm_id, Some(113314));
    assert_eq!(seen.lock().unwrap()[1].0.get("limit").map(String::as_str), Some("10"));
}

async fn late_page(State(hits): State<Arc<AtomicUsize>>) -> Html<&'static str> {
    if hits.fetch_add(1, Ordering::SeqCst) < 2 {
        Html("<html><body><p>Loading…</p></body></html>")
    } else {
        Html("<html><body><div class='ready'>Done</div></body></html>")
    }
}

fn browser() -> HttpBrowser {
    HttpBrowser::new(TEST_AGENT, Duration::from_secs(5)).unwrap()
}

fn polling_browser() -> HttpBrowser {
    browser().with_reload_polling(Duration::from_millis(50))
}

#[tokio::test]
async fn test_wait_for_selector_reloads_until_marker_attaches() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_stub(
        Router::new()
            .route("/late", get(late_page))
            .with_state(hits.clone()),
    );

    let mut session = polling_browser().launch().await.unwrap();
    let page = session.page();
    page.goto(&format!("{base}/late")).await.unwrap();
    page.wait_for_selector("div.ready", Duration::from_secs(3))
        .await
        .unwrap();

    let ready = page.query_selector("div.ready").await.unwrap().unwrap();
    assert_eq!(ready.inner_text(), "Done");
    assert!(hits.load(Ordering::SeqCst) >= 3);
    session.close().await.unwrap();
}

#[tokio::test]
async fn test_wait_for_selector_without_polling_checks_once() {
    let hits = Arc::new(AtomicUsize::new(0));
    let base = spawn_stub(
        Router::new()
            .route("/late", get(late_page))
            .with_state(hits.clone()),
    );

    let mut session = browser().launch().await.unwrap();
    let page = session.page();
    page.goto(&format!("{base}/late")).await.unwrap();

    let started = std::time::Instant::now();
    let err = page
        .wait_for_selector("div.ready", Duration::from_secs(3))
        .await
        .unwrap_err();

    assert!(matches!(err, ScraperError::Timeout { .. }));
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_wait_for_selector_times_out() {
    let base = spawn_stub(Router::new().route("/never", get(|| async { Html("<p>nothing</p>") })));

    let mut session = polling_browser().launch().await.unwrap();
    let page = session.page();
    page.goto(&format!("{base}/never")).await.unwrap();

    let err = page
        .wait_for_selector("div.ready", Duration::from_millis(200))
        .await
        .unwrap_err();
    assert!(matches!(err, ScraperError::Timeout { .. }));
    assert_eq!(page.url(), Some(format!("{base}/never").as_str()));
}

#[tokio::test]
async fn test_goto_unreachable_host_is_an_error() {
    let mut session = browser().launch().await.unwrap();
    let err = session.page().goto("http://127.0.0.1:1/").await.unwrap_err();
    assert!(matches!(err, ScraperError::Http(_)));
}

const LISTINGS: &str = r#"<html><body>
  <a class="event-card-link" href="/e/jazz-brunch" aria-label="Jazz Brunch">Jazz Brunch</a>
  <a class="event-card-link" href="http://127.0.0.1:1/e/unreachable" aria-label="Unreachable">Unreachable</a>
  <a class="event-card-link" href="/e/jazz-brunch" aria-label="Jazz Brunch">Jazz Brunch</a>
</body></html>"#;

const DETAILS: &str = r#"<html><body>
  <div class="has-user-generated-content event-description">
    <p>Brunch with a trio.</p>
  </div>
  <div class="location-info__address">The Driskill<br>604 Brazos St<br>Austin, TX 78701<br>Show map</div>
</body></html>"#;

#[tokio::test]
async fn test_gather_end_to_end_over_http() {
    let (geo_base, seen) = geocoder_stub();
    let site = spawn_stub(
        Router::new()
            .route("/d/austin/all-events/", get(|| async { Html(LISTINGS) }))
            .route("/e/jazz-brunch", get(|| async { Html(DETAILS) })),
    );

    let gather = GatherUseCase::new(Arc::new(geocoder(&geo_base)), Arc::new(browser()), 5);
    let scraper = EventbriteScraper::with_base_url(site.clone());

    let events = gather.gather_from(&scraper, "Austin").await.unwrap();

    assert_eq!(events.len(), 2);
    let jazz = &events[0];
    assert_eq!(jazz.url, format!("{site}/e/jazz-brunch"));
    assert_eq!(jazz.description.as_deref(), Some("Brunch with a trio."));
    assert_eq!(jazz.venue.as_deref(), Some("604 Brazos St"));
    assert_eq!(jazz.lat.as_deref(), Some("30.2682"));

    let unreachable = &events[1];
    assert!(unreachable.venue.is_none());
    assert_eq!(unreachable.lat.as_deref(), Some("30.2711286"));

    let queries: Vec<String> = seen
        .lock()
        .unwrap()
        .iter()
        .filter_map(|(params, _)| params.get("q").cloned())
        .collect();
    assert_eq!(queries, vec!["Austin", "604 Brazos St, Austin"]);
}
