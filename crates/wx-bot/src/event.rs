//! Platform-neutral chat event model
//!
//! Chat bindings translate their native update types into these before
//! handing them to the controller.

use std::fmt;

/// Opaque room/chat identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomId(pub String);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Payload of an incoming chat event
#[derive(Debug, Clone)]
pub enum EventContent {
    /// A shared location carrying a `geo:<lat>,<lon>` URI
    Location { geo_uri: String },
    /// A plain text message
    Text { body: String },
}

/// An incoming chat event
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub room: RoomId,
    pub sender: UserId,
    pub content: EventContent,
}

impl ChatEvent {
    pub fn text(room: impl Into<String>, sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            room: RoomId(room.into()),
            sender: UserId(sender.into()),
            content: EventContent::Text { body: body.into() },
        }
    }

    pub fn location(
        room: impl Into<String>,
        sender: impl Into<String>,
        geo_uri: impl Into<String>,
    ) -> Self {
        Self {
            room: RoomId(room.into()),
            sender: UserId(sender.into()),
            content: EventContent::Location {
                geo_uri: geo_uri.into(),
            },
        }
    }
}
