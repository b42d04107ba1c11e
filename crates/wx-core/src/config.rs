//! Configuration management
//!
//! Configuration is resolved in the following priority order:
//! 1. Environment variables
//! 2. wx-gateway.toml configuration file
//! 3. Default values
//!
//! `${VAR_NAME}` inside the configuration file expands to the value of the
//! corresponding environment variable.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// Telegram bot configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TelegramConfig {
    /// Bot token (optional; the bot is disabled without one)
    pub token: Option<String>,
}

/// Login form server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginConfig {
    /// Bind host
    #[serde(default = "default_login_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_login_port")]
    pub port: u16,

    /// Public URL advertised in chat messages (reverse-proxy aware)
    #[serde(default)]
    pub public_url: Option<String>,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            host: default_login_host(),
            port: default_login_port(),
            public_url: None,
        }
    }
}

impl LoginConfig {
    /// URL of the login form as shown to chat users
    pub fn login_url(&self) -> String {
        match &self.public_url {
            Some(url) => format!("{}/login", url.trim_end_matches('/')),
            None => format!("http://{}:{}/login", self.host, self.port),
        }
    }
}

/// windy.com account API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Base URL of the account API
    #[serde(default = "default_account_base_url")]
    pub base_url: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            base_url: default_account_base_url(),
        }
    }
}

/// Crop rectangle applied to the forecast panel screenshot
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CropRect {
    #[serde(default)]
    pub x: u32,
    #[serde(default = "default_crop_y")]
    pub y: u32,
    #[serde(default = "default_crop_width")]
    pub width: u32,
    #[serde(default = "default_crop_height")]
    pub height: u32,
}

impl Default for CropRect {
    fn default() -> Self {
        Self {
            x: 0,
            y: default_crop_y(),
            width: default_crop_width(),
            height: default_crop_height(),
        }
    }
}

/// Headless browser settings for the scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserSettings {
    /// Path to the Chrome/Chromium executable (autodetected when unset)
    pub chrome_path: Option<String>,

    /// Run the browser headless
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Browser viewport width in pixels
    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    /// Browser viewport height in pixels
    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Navigation timeout in seconds
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout: u64,

    /// Bounded wait for the forecast panel to finish rendering, in seconds
    #[serde(default = "default_render_timeout")]
    pub render_timeout: u64,

    /// Screenshot crop rectangle
    #[serde(default)]
    pub crop: CropRect,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            navigation_timeout: default_navigation_timeout(),
            render_timeout: default_render_timeout(),
            crop: CropRect::default(),
        }
    }
}

/// Main configuration for wx-gateway
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Telegram configuration
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Login form server configuration
    #[serde(default)]
    pub login: LoginConfig,

    /// windy.com account API configuration
    #[serde(default)]
    pub account: AccountConfig,

    /// Headless browser configuration
    #[serde(default)]
    pub browser: BrowserSettings,
}

fn default_login_host() -> String {
    "127.0.0.1".to_string()
}

fn default_login_port() -> u16 {
    8080
}

fn default_account_base_url() -> String {
    "https://account.windy.com".to_string()
}

fn default_crop_y() -> u32 {
    120
}

fn default_crop_width() -> u32 {
    1245
}

fn default_crop_height() -> u32 {
    800
}

fn default_true() -> bool {
    true
}

fn default_viewport_width() -> u32 {
    1920
}

fn default_viewport_height() -> u32 {
    1080
}

fn default_navigation_timeout() -> u64 {
    30
}

fn default_render_timeout() -> u64 {
    15
}

impl Config {
    /// Expand `${VAR_NAME}` references to environment variable values
    ///
    /// Unset variables expand to the empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '}' {
                        chars.next();
                        break;
                    }
                    var_name.push(chars.next().unwrap());
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Load configuration from a TOML file
    ///
    /// `${VAR_NAME}` inside the file is expanded first; explicitly set
    /// environment variables still override file values afterwards.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let expanded_content = Self::expand_env_vars(&toml_content);

        let mut config: Config = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load configuration from the default locations
    ///
    /// Tries `./wx-gateway.toml` first, then falls back to environment
    /// variables only.
    pub fn load() -> crate::Result<Self> {
        if Path::new("wx-gateway.toml").exists() {
            return Self::from_toml_file("wx-gateway.toml");
        }

        Ok(Self::from_env())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Override configuration values from environment variables
    fn apply_env_overrides(&mut self) {
        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            if !token.is_empty() {
                self.telegram.token = Some(token);
            }
        }

        if let Ok(host) = std::env::var("LOGIN_HOST") {
            if !host.is_empty() {
                self.login.host = host;
            }
        }
        if let Ok(port) = std::env::var("LOGIN_PORT") {
            if let Ok(p) = port.parse() {
                self.login.port = p;
            }
        }
        if let Ok(url) = std::env::var("LOGIN_PUBLIC_URL") {
            if !url.is_empty() {
                self.login.public_url = Some(url);
            }
        }

        if let Ok(url) = std::env::var("ACCOUNT_BASE_URL") {
            if !url.is_empty() {
                self.account.base_url = url;
            }
        }

        if let Ok(path) = std::env::var("CHROME_PATH") {
            if !path.is_empty() {
                self.browser.chrome_path = Some(path);
            }
        }
        if let Ok(headless) = std::env::var("BROWSER_HEADLESS") {
            self.browser.headless = headless.to_lowercase() != "false";
        }
        if let Ok(timeout) = std::env::var("BROWSER_NAVIGATION_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.browser.navigation_timeout = t;
            }
        }
        if let Ok(timeout) = std::env::var("BROWSER_RENDER_TIMEOUT") {
            if let Ok(t) = timeout.parse() {
                self.browser.render_timeout = t;
            }
        }
    }
}
