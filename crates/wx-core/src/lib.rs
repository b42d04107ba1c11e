//! wx-core: Weather Gateway Core Library
//!
//! Shared building blocks for the wx-gateway workspace: configuration,
//! error types, the session-cookie store and coordinate extraction.

pub mod config;
pub mod coords;
pub mod credentials;
pub mod error;

pub use config::{AccountConfig, BrowserSettings, Config, CropRect, LoginConfig, TelegramConfig};
pub use coords::Coordinates;
pub use credentials::{CredentialStatus, CredentialStore, SessionCookies, SID_COOKIE, SS_COOKIE};
pub use error::{Error, Result};
