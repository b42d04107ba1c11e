//! Outgoing message abstraction
//!
//! The controller only ever talks to a [`Responder`]; chat bindings
//! implement it over their platform API, tests implement it over a
//! recording stub.

use async_trait::async_trait;

use crate::error::Result;
use crate::event::RoomId;

/// Reference to a previously sent message, required for edit and redact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHandle(pub String);

/// A media message carrying the forecast image
#[derive(Debug, Clone)]
pub struct MediaMessage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    pub caption: String,
}

impl MediaMessage {
    /// Build a PNG media message
    pub fn png(bytes: Vec<u8>, width: u32, height: u32, caption: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: "image/png".to_string(),
            width,
            height,
            caption: caption.into(),
        }
    }
}

/// Outgoing chat actions
#[async_trait]
pub trait Responder: Send + Sync {
    /// Send a plain text message, returning its handle
    async fn send(&self, room: &RoomId, text: &str) -> Result<MessageHandle>;

    /// Send an HTML-formatted message, returning its handle
    async fn send_html(&self, room: &RoomId, html: &str) -> Result<MessageHandle>;

    /// Edit a previously sent message in place
    async fn edit(&self, room: &RoomId, handle: &MessageHandle, text: &str) -> Result<()>;

    /// Redact (delete) a previously sent message
    async fn redact(&self, room: &RoomId, handle: &MessageHandle) -> Result<()>;

    /// Send a media message
    async fn send_media(&self, room: &RoomId, media: MediaMessage) -> Result<()>;
}
