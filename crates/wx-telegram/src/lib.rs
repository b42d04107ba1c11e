//! wx-telegram: Telegram binding for wx-gateway
//!
//! Translates Telegram updates into `wx-bot` chat events and implements
//! the responder over the Telegram Bot API. Shared locations arrive as
//! `geo:<lat>,<lon>` URIs, so the controller never sees Telegram types.

pub mod bot;
pub mod error;
pub mod responder;

pub use bot::TelegramBot;
pub use error::{Result, TelegramError};
pub use responder::TelegramResponder;
