//! windy.com multimodel forecast scraper
//!
//! One scrape drives a fresh browser session: attach stored session
//! cookies when present, navigate to the forecast page, suppress the
//! onboarding overlay, wait for the embedded forecast panel to render and
//! capture a cropped screenshot of it.

use tracing::{info, warn};

use wx_core::{Coordinates, SessionCookies};

use crate::error::Result;
use crate::session::{BrowserConfig, BrowserSession};

/// Base URL of the multimodel forecast page
const FORECAST_BASE_URL: &str = "https://www.windy.com/multimodel";

/// Selector of the embedded forecast panel
const FORECAST_PANEL_SELECTOR: &str = "iframe";

/// Selector present only when the session is authenticated
const LOGGED_IN_SELECTOR: &str = ".user-avatar";

/// Client-side flag that suppresses the onboarding overlay
///
/// Without this the first-visit overlay sits on top of the forecast panel
/// and ends up in the screenshot. Set before reload so the reloaded page
/// starts with onboarding already completed.
const ONBOARDING_COMPLETE_JS: &str = "localStorage.setItem('onboardingWasShown', 'true')";

/// Reads the resolved place name out of the page's search input
const PLACE_NAME_JS: &str =
    "(function() { var el = document.querySelector('input'); return el ? el.value : ''; })()";

/// Coarse progress stages reported during a scrape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeStage {
    /// Browser process is starting
    Launching,
    /// Forecast page is loading
    Loading,
    /// Place name and screenshot are being extracted
    Extracting,
}

/// Outcome of a single scrape
///
/// `image: None` is a degraded success, not an error: the page loaded but
/// the forecast panel never appeared.
#[derive(Debug, Clone, Default)]
pub struct ForecastResult {
    /// Resolved place name; empty when the lookup failed
    pub place: String,
    /// Whether the session carried a valid windy.com login
    pub authenticated: bool,
    /// Cropped PNG of the forecast panel, absent when it did not render
    pub image: Option<Vec<u8>>,
}

/// Scrapes windy.com forecast panels with a fresh browser per request
///
/// Expensive: every call spawns and tears down a full Chrome process.
/// There is no pooling; concurrent scrapes each launch their own browser.
#[derive(Debug, Clone)]
pub struct ForecastScraper {
    config: BrowserConfig,
}

impl ForecastScraper {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// Forecast page URL for the given coordinates
    pub fn forecast_url(coords: &Coordinates) -> String {
        format!(
            "{}/{}/{}",
            FORECAST_BASE_URL, coords.latitude, coords.longitude
        )
    }

    /// Scrape the forecast panel for the given coordinates
    ///
    /// `on_stage` is invoked as the scrape progresses so the caller can
    /// surface progress to the user. The browser process is released when
    /// this function returns, on error paths included.
    pub fn scrape(
        &self,
        coords: &Coordinates,
        cookies: Option<&SessionCookies>,
        on_stage: &(dyn Fn(ScrapeStage) + Send + Sync),
    ) -> Result<ForecastResult> {
        on_stage(ScrapeStage::Launching);
        let session = BrowserSession::launch(self.config.clone())?;

        if let Some(cookies) = cookies {
            session.attach_cookies(cookies)?;
        }

        on_stage(ScrapeStage::Loading);
        let url = Self::forecast_url(coords);
        session.navigate(&url)?;

        // First visit shows an onboarding overlay on top of the forecast
        // panel; mark it completed and reload to get a clean page.
        session.evaluate_js(ONBOARDING_COMPLETE_JS)?;
        session.reload()?;

        on_stage(ScrapeStage::Extracting);

        // The chart library renders asynchronously after the DOM settles.
        // Poll for the panel with a bounded timeout; not showing up in
        // time is a degraded outcome, not an error.
        let panel_rendered = match session
            .wait_for(FORECAST_PANEL_SELECTOR, self.config.render_timeout)
        {
            Ok(()) => true,
            Err(e) => {
                warn!("Forecast panel did not render: {}", e);
                false
            }
        };

        let place = session
            .evaluate_js(PLACE_NAME_JS)?
            .as_str()
            .unwrap_or_default()
            .to_string();

        let authenticated = session.element_exists(LOGGED_IN_SELECTOR);

        let image = if panel_rendered {
            Some(session.screenshot_crop(&self.config.crop)?)
        } else {
            None
        };

        info!(
            "Scraped forecast for '{}' (authenticated: {}, image: {})",
            place,
            authenticated,
            image.is_some()
        );

        Ok(ForecastResult {
            place,
            authenticated,
            image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_url() {
        let coords = Coordinates::new(51.5074, -0.1278);
        assert_eq!(
            ForecastScraper::forecast_url(&coords),
            "https://www.windy.com/multimodel/51.5074/-0.1278"
        );
    }

    #[test]
    fn test_forecast_url_integral_coordinates() {
        let coords = Coordinates::new(48.0, 16.0);
        assert_eq!(
            ForecastScraper::forecast_url(&coords),
            "https://www.windy.com/multimodel/48/16"
        );
    }

    #[test]
    fn test_result_default_is_degraded() {
        let result = ForecastResult::default();
        assert!(result.place.is_empty());
        assert!(!result.authenticated);
        assert!(result.image.is_none());
    }
}
