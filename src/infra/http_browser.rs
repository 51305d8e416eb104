//! A page driver that loads documents over plain HTTP and evaluates
//! selectors against the returned markup. Nothing is executed, so pages that
//! build their listings client-side only match once the server renders them.
//!
//! A selector wait checks the loaded document once. With reload polling
//! enabled it instead re-fetches the page every interval until the selector
//! attaches or the wait times out; every poll is another outbound GET.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::app::ports::{BrowserLauncher, BrowserSession, PagePort};
use crate::common::dom::{self, Element};
use crate::common::error::{Result, ScraperError};
use crate::config::Config;

pub struct HttpBrowser {
    client: reqwest::Client,
    user_agent: String,
    reload_interval: Option<Duration>,
}

impl HttpBrowser {
    pub fn new(user_agent: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .deflate(true)
            .build()?;
        Ok(Self {
            client,
            user_agent: user_agent.into(),
            reload_interval: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let browser = Self::new(config.user_agent.clone(), config.http_timeout())?;
        Ok(match config.reload_interval() {
            Some(interval) => browser.with_reload_polling(interval),
            None => browser,
        })
    }

    /// Re-fetch the page every `interval` while a selector is missing
    pub fn with_reload_polling(mut self, interval: Duration) -> Self {
        self.reload_interval = Some(interval);
        self
    }
}

#[async_trait]
impl BrowserLauncher for HttpBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        debug!("Opening HTTP browser session");
        Ok(Box::new(HttpSession {
            page: HttpPage {
                client: self.client.clone(),
                user_agent: self.user_agent.clone(),
                reload_interval: self.reload_interval,
                current_url: None,
                document: None,
                loads: 0,
            },
        }))
    }
}

pub struct HttpSession {
    page: HttpPage,
}

#[async_trait]
impl BrowserSession for HttpSession {
    fn page(&mut self) -> &mut dyn PagePort {
        &mut self.page
    }

    async fn close(self: Box<Self>) -> Result<()> {
        debug!(loads = self.page.loads, "Closing HTTP browser session");
        Ok(())
    }
}

pub struct HttpPage {
    client: reqwest::Client,
    user_agent: String,
    reload_interval: Option<Duration>,
    current_url: Option<String>,
    document: Option<String>,
    loads: usize,
}

impl HttpPage {
    async fn load(&mut self, url: &str) -> Result<()> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        let final_url = response.url().to_string();
        let body = response.text().await?;
        if !status.is_success() {
            debug!(url = %url, status = %status, "Page loaded with non-success status");
        }

        self.current_url = Some(final_url);
        self.document = Some(body);
        self.loads += 1;
        Ok(())
    }

    fn document(&self) -> &str {
        self.document.as_deref().unwrap_or_default()
    }
}

#[async_trait]
impl PagePort for HttpPage {
    #[instrument(skip(self))]
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.load(url).await
    }

    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let started = Instant::now();
        loop {
            if dom::has_match(self.document(), selector)? {
                return Ok(());
            }

            let elapsed = started.elapsed();
            let interval = match self.reload_interval {
                Some(interval) if elapsed < timeout => interval,
                _ => {
                    return Err(ScraperError::Timeout {
                        selector: selector.to_string(),
                        timeout,
                    })
                }
            };

            tokio::time::sleep(interval.min(timeout - elapsed)).await;

            let remaining = timeout.saturating_sub(started.elapsed());
            let Some(url) = self.current_url.clone() else {
                continue;
            };
            if remaining.is_zero() {
                continue;
            }
            match tokio::time::timeout(remaining, self.load(&url)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!(url = %url, error = %e, "Reload failed while waiting for selector"),
                Err(_) => debug!(url = %url, "Reload did not finish before the wait timed out"),
            }
        }
    }

    async fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>> {
        dom::select_all(self.document(), selector)
    }

    fn url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }
}
