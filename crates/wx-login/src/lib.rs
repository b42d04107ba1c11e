//! wx-login: windy.com authentication for wx-gateway
//!
//! Two halves: an HTTP client for the windy.com account API (login and
//! session probing), and a small axum server exposing a login form so
//! chat users can hand over credentials without pasting them into a room.

pub mod api;
pub mod error;
pub mod pages;
pub mod server;

pub use api::AccountClient;
pub use error::{LoginError, Result};
pub use server::LoginServer;
