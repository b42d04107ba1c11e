//! Browser session management
//!
//! Provides a managed browser instance with automatic lifecycle handling.
//! The Chrome process is owned by the session and killed when the session
//! is dropped, so every exit path releases it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptionsBuilder, Tab, protocol::cdp::Page};
use std::sync::Arc;
use tracing::{debug, info};

use wx_core::{BrowserSettings, CropRect, SessionCookies};

use crate::error::{BrowserError, Result};

/// Browser session configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Whether to run in headless mode
    pub headless: bool,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Path to the Chrome/Chromium executable (autodetected when unset)
    pub chrome_path: Option<PathBuf>,
    /// Navigation timeout in seconds
    pub navigation_timeout: u64,
    /// Bounded wait for the forecast panel to render, in seconds
    pub render_timeout: u64,
    /// Crop rectangle for the forecast panel screenshot
    pub crop: CropRect,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            width: 1920,
            height: 1080,
            chrome_path: None,
            navigation_timeout: 30,
            render_timeout: 15,
            crop: CropRect::default(),
        }
    }
}

impl BrowserConfig {
    /// Create a new configuration builder
    pub fn builder() -> BrowserConfigBuilder {
        BrowserConfigBuilder::default()
    }
}

impl From<&BrowserSettings> for BrowserConfig {
    fn from(settings: &BrowserSettings) -> Self {
        Self {
            headless: settings.headless,
            width: settings.viewport_width,
            height: settings.viewport_height,
            chrome_path: settings.chrome_path.as_ref().map(PathBuf::from),
            navigation_timeout: settings.navigation_timeout,
            render_timeout: settings.render_timeout,
            crop: settings.crop,
        }
    }
}

/// Builder for BrowserConfig
#[derive(Default)]
pub struct BrowserConfigBuilder {
    config: BrowserConfig,
}

impl BrowserConfigBuilder {
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn window_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    pub fn navigation_timeout(mut self, seconds: u64) -> Self {
        self.config.navigation_timeout = seconds;
        self
    }

    pub fn render_timeout(mut self, seconds: u64) -> Self {
        self.config.render_timeout = seconds;
        self
    }

    pub fn crop(mut self, crop: CropRect) -> Self {
        self.config.crop = crop;
        self
    }

    pub fn build(self) -> BrowserConfig {
        self.config
    }
}

/// Managed browser session
pub struct BrowserSession {
    browser: Browser,
    config: BrowserConfig,
}

impl BrowserSession {
    /// Launch a browser with the given configuration
    pub fn launch(config: BrowserConfig) -> Result<Self> {
        use std::ffi::OsStr;

        info!("Launching browser session (headless: {})", config.headless);

        let args: Vec<String> = vec![
            format!("--window-size={},{}", config.width, config.height),
            "--no-sandbox".to_string(),
            "--disable-gpu".to_string(),
            "--disable-dev-shm-usage".to_string(),
        ];

        let os_args: Vec<&OsStr> = args.iter().map(OsStr::new).collect();

        // An idle browser is torn down after this long; a hang in the
        // external site cannot block the request task forever.
        let idle_timeout =
            Duration::from_secs(config.navigation_timeout + config.render_timeout + 30);

        let launch_options = LaunchOptionsBuilder::default()
            .headless(config.headless)
            .path(config.chrome_path.clone())
            .args(os_args)
            .idle_browser_timeout(idle_timeout)
            .build()
            .map_err(|e| {
                BrowserError::Initialization(format!("Failed to build launch options: {}", e))
            })?;

        let browser = Browser::new(launch_options)
            .map_err(|e| BrowserError::Initialization(format!("Failed to launch browser: {}", e)))?;

        Ok(Self { browser, config })
    }

    /// Get the active tab
    pub fn active_tab(&self) -> Result<Arc<Tab>> {
        let tabs = self.browser.get_tabs();
        let tabs_guard = tabs
            .lock()
            .map_err(|e| BrowserError::TabError(format!("Failed to lock tabs: {}", e)))?;

        tabs_guard
            .first()
            .cloned()
            .ok_or_else(|| BrowserError::TabError("No active tab available".to_string()))
    }

    /// Attach session cookies as a request header for all further requests
    pub fn attach_cookies(&self, cookies: &SessionCookies) -> Result<()> {
        let tab = self.active_tab()?;

        debug!("Attaching session cookies to browser session");

        let header_value = cookies.header_value();
        let mut headers = HashMap::new();
        headers.insert("Cookie", header_value.as_str());

        tab.set_extra_http_headers(headers)
            .map_err(|e| BrowserError::Cookie(format!("Failed to set cookie header: {}", e)))?;

        Ok(())
    }

    /// Navigate to a URL and wait for the navigation to settle
    pub fn navigate(&self, url: &str) -> Result<()> {
        let tab = self.active_tab()?;

        info!("Navigating to: {}", url);

        tab.set_default_timeout(Duration::from_secs(self.config.navigation_timeout));

        tab.navigate_to(url)
            .map_err(|e| BrowserError::Navigation(format!("Failed to navigate to {}: {}", url, e)))?;

        tab.wait_until_navigated()
            .map_err(|e| BrowserError::Navigation(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// Reload the current page and wait for it to settle
    pub fn reload(&self) -> Result<()> {
        let tab = self.active_tab()?;

        debug!("Reloading page");

        tab.reload(false, None)
            .map_err(|e| BrowserError::Navigation(format!("Failed to reload: {}", e)))?;

        tab.wait_until_navigated()
            .map_err(|e| BrowserError::Navigation(format!("Navigation timeout: {}", e)))?;

        Ok(())
    }

    /// Execute JavaScript in the page
    pub fn evaluate_js(&self, script: &str) -> Result<serde_json::Value> {
        let tab = self.active_tab()?;

        debug!(
            "Executing JavaScript: {}...",
            &script[..std::cmp::min(50, script.len())]
        );

        let result = tab
            .evaluate(script, false)
            .map_err(|e| BrowserError::Extraction(format!("JavaScript execution failed: {}", e)))?;

        Ok(result.value.unwrap_or(serde_json::Value::Null))
    }

    /// Wait for an element to appear, with a bounded timeout
    pub fn wait_for(&self, selector: &str, timeout_secs: u64) -> Result<()> {
        let tab = self.active_tab()?;
        let timeout = Duration::from_secs(timeout_secs);

        debug!("Waiting for element: {} (timeout: {:?})", selector, timeout);

        tab.wait_for_element_with_custom_timeout(selector, timeout)
            .map_err(|e| {
                BrowserError::Timeout(format!(
                    "Element '{}' not found within timeout: {}",
                    selector, e
                ))
            })?;

        Ok(())
    }

    /// Whether an element is currently present in the page
    pub fn element_exists(&self, selector: &str) -> bool {
        match self.active_tab() {
            Ok(tab) => tab.find_element(selector).is_ok(),
            Err(_) => false,
        }
    }

    /// Capture a pixel-exact crop of the page as PNG
    pub fn screenshot_crop(&self, crop: &CropRect) -> Result<Vec<u8>> {
        let tab = self.active_tab()?;

        debug!(
            "Capturing {}x{} screenshot at ({}, {})",
            crop.width, crop.height, crop.x, crop.y
        );

        let clip = Page::Viewport {
            x: crop.x as f64,
            y: crop.y as f64,
            width: crop.width as f64,
            height: crop.height as f64,
            scale: 1.0,
        };

        let screenshot = tab
            .capture_screenshot(
                Page::CaptureScreenshotFormatOption::Png,
                None,
                Some(clip),
                true,
            )
            .map_err(|e| BrowserError::Screenshot(format!("Failed to capture screenshot: {}", e)))?;

        info!("Screenshot captured: {} bytes", screenshot.len());

        Ok(screenshot)
    }

    /// Get the browser configuration
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        debug!("Closing browser session");
        // The Chrome process is killed when the Browser handle is dropped
    }
}
