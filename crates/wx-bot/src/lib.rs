//! wx-bot: platform-agnostic bot controller for wx-gateway
//!
//! Classifies incoming chat events, extracts coordinates or command
//! keywords and drives the forecast workflow: progress message, scrape,
//! media delivery. Chat platforms plug in through the [`Responder`] trait;
//! the scraper plugs in through [`ForecastProvider`].

pub mod commands;
pub mod controller;
pub mod error;
pub mod event;
pub mod responder;
pub mod scrape;

pub use commands::Command;
pub use controller::{BotConfig, BotController};
pub use error::{BotError, Result};
pub use event::{ChatEvent, EventContent, RoomId, UserId};
pub use responder::{MediaMessage, MessageHandle, Responder};
pub use scrape::{BrowserForecastProvider, CredentialProbe, ForecastProvider};
