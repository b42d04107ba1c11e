//! Error types for wx-login

use thiserror::Error;

/// wx-login error type
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Login rejected with status {0}")]
    Rejected(u16),

    #[error("Login response did not contain session cookies")]
    MissingCookies,

    #[error("Server error: {0}")]
    Server(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, LoginError>;
