//! wx-browser: Headless Chrome scraping for wx-gateway
//!
//! Drives a headless Chrome instance against windy.com's multimodel
//! forecast page and captures a cropped screenshot of the forecast panel.
//! One browser process per scrape; the process is released when the
//! session goes out of scope, on error paths included.

pub mod error;
pub mod scraper;
pub mod session;

pub use error::{BrowserError, Result};
pub use scraper::{ForecastResult, ForecastScraper, ScrapeStage};
pub use session::{BrowserConfig, BrowserConfigBuilder, BrowserSession};
