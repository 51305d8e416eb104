#![allow(dead_code)]

use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;

use city_events::app::ports::{BrowserLauncher, BrowserSession, GeocoderPort, PagePort};
use city_events::common::dom::{self, Element};
use city_events::common::types::Place;
use city_events::{Result, ScraperError};

/// Serves `router` on an ephemeral local port and returns its base URL.
pub fn spawn_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
    let addr = listener.local_addr().expect("stub address");
    let server = axum::Server::from_tcp(listener)
        .expect("stub server")
        .serve(router.into_make_service());
    tokio::spawn(server);
    format!("http://{addr}")
}

/// Browser that serves canned documents keyed by URL.
#[derive(Clone, Default)]
pub struct FakeBrowser {
    pages: Arc<HashMap<String, String>>,
    visited: Arc<Mutex<Vec<String>>>,
    fail_launch: Option<String>,
}

impl FakeBrowser {
    pub fn new(pages: &[(&str, &str)]) -> Self {
        Self {
            pages: Arc::new(
                pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_launch: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserLauncher for FakeBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        if let Some(message) = &self.fail_launch {
            return Err(ScraperError::Browser {
                message: message.clone(),
            });
        }
        Ok(Box::new(FakeSession {
            page: FakePage {
                browser: self.clone(),
                url: None,
                document: String::new(),
            },
        }))
    }
}

struct FakeSession {
    page: FakePage,
}

#[async_trait]
impl BrowserSession for FakeSession {
    fn page(&mut self) -> &mut dyn PagePort {
        &mut self.page
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

struct FakePage {
    browser: FakeBrowser,
    url: Option<String>,
    document: String,
}

#[async_trait]
impl PagePort for FakePage {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.browser.visited.lock().unwrap().push(url.to_string());
        match self.browser.pages.get(url) {
            Some(html) => {
                self.url = Some(url.to_string());
                self.document = html.clone();
                Ok(())
            }
            None => Err(ScraperError::Browser {
                message: format!("net::ERR_NAME_NOT_RESOLVED at {url}"),
            }),
        }
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        if dom::has_match(&self.document, selector)? {
            Ok(())
        } else {
            Err(ScraperError::Timeout {
                selector: selector.to_string(),
                timeout,
            })
        }
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>> {
        dom::select_all(&self.document, selector)
    }

    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

/// Geocoder answering from a fixed table
#[derive(Default)]
pub struct FakeGeocoder {
    places: HashMap<String, Vec<Place>>,
}

impl FakeGeocoder {
    pub fn new(entries: &[(&str, &str, &str)]) -> Self {
        Self {
            places: entries
                .iter()
                .map(|(query, lat, lon)| {
                    (
                        query.to_string(),
                        vec![Place {
                            lat: Some(lat.to_string()),
                            lon: Some(lon.to_string()),
                            display_name: Some(query.to_string()),
                            osm_type: Some("node".to_string()),
                            osm_id: Some(42),
                        }],
                    )
                })
                .collect(),
        }
    }
}

#[async_trait]
impl GeocoderPort for FakeGeocoder {
    async fn search(&self, query: &str, _limit: usize) -> Result<Vec<Place>> {
        Ok(self.places.get(query).cloned().unwrap_or_default())
    }
}

pub const AUSTIN_LISTINGS: &str = r#"<html><body>
  <section>
    <a class="event-card-link" href="https://www.eventbrite.com/e/taco-fest-1" aria-label="Taco Fest" data-event-location="Fiesta Gardens">Taco Fest</a>
    <a class="event-card-link" href="https://www.eventbrite.com/e/taco-fest-1" aria-label="Taco Fest">Taco Fest</a>
    <a class="event-card-link" href="https://www.eventbrite.com/e/jazz-2" aria-label="Jazz Brunch">Jazz Brunch</a>
    <a class="event-card-link" href="https://www.eventbrite.com/e/broken-3" aria-label="Broken Page">Broken</a>
  </section>
</body></html>"#;

pub const JAZZ_DETAILS: &str = r#"<html><body>
  <div class="has-user-generated-content event-description"><p>Live jazz and brunch.</p></div>
  <div class="location-info__address"><p>The Driskill</p><p>604 Brazos St</p><p>Austin, TX 78701</p><button>Show map</button></div>
</body></html>"#;

pub const TACO_DETAILS: &str = r#"<html><body>
  <div class="has-user-generated-content event-description">  </div>
  <p>Location to be announced</p>
</body></html>"#;
