//! Error types for wx-browser

use thiserror::Error;

/// wx-browser error type
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Browser initialization failed: {0}")]
    Initialization(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Tab error: {0}")]
    TabError(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Timeout: {0}")]
    Timeout(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, BrowserError>;
