//! Trait seams towards the scraper and the account probe
//!
//! The controller depends on these traits so tests can stub both the
//! expensive browser scrape and the outbound credential probe.

use async_trait::async_trait;
use tokio::sync::mpsc;

use wx_browser::{ForecastResult, ForecastScraper, ScrapeStage};
use wx_core::{Coordinates, CredentialStatus, SessionCookies};

use crate::error::{BotError, Result};

/// Produces a forecast for a coordinate pair
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Run a scrape, streaming progress stages through `stages`
    ///
    /// The sender is dropped when the scrape finishes, which closes the
    /// receiving side.
    async fn forecast(
        &self,
        coords: Coordinates,
        cookies: Option<SessionCookies>,
        stages: mpsc::UnboundedSender<ScrapeStage>,
    ) -> Result<ForecastResult>;
}

/// Reports the validity of the stored credentials
#[async_trait]
pub trait CredentialProbe: Send + Sync {
    async fn check(&self) -> CredentialStatus;
}

/// [`ForecastProvider`] backed by the headless Chrome scraper
///
/// `headless_chrome` blocks, so the scrape runs on the blocking thread
/// pool.
pub struct BrowserForecastProvider {
    scraper: ForecastScraper,
}

impl BrowserForecastProvider {
    pub fn new(scraper: ForecastScraper) -> Self {
        Self { scraper }
    }
}

#[async_trait]
impl ForecastProvider for BrowserForecastProvider {
    async fn forecast(
        &self,
        coords: Coordinates,
        cookies: Option<SessionCookies>,
        stages: mpsc::UnboundedSender<ScrapeStage>,
    ) -> Result<ForecastResult> {
        let scraper = self.scraper.clone();

        tokio::task::spawn_blocking(move || {
            scraper.scrape(&coords, cookies.as_ref(), &move |stage| {
                // Receiver may be gone already; stage updates are best effort
                let _ = stages.send(stage);
            })
        })
        .await
        .map_err(|e| BotError::Scrape(format!("Scrape task panicked: {}", e)))?
        .map_err(|e| BotError::Scrape(e.to_string()))
    }
}
