//! Error types for wx-bot

use thiserror::Error;

/// wx-bot error type
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Responder error: {0}")]
    Responder(String),

    #[error("Scrape error: {0}")]
    Scrape(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, BotError>;
