//! Incoming text classification
//!
//! Coordinates win over command keywords; commands are matched on the
//! first whitespace token rather than by substring containment, so a
//! sentence that merely mentions "version" is not a command.

use wx_core::Coordinates;

/// What an incoming text message asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A coordinate pair was found; run the forecast workflow
    Forecast(Coordinates),
    /// Report the gateway version
    Version,
    /// Report stored credential validity
    Auth,
    /// Anything else falls through to the help text
    Help,
}

impl Command {
    /// Classify a text message body
    pub fn classify(text: &str) -> Self {
        if let Some(coords) = Coordinates::find_in_text(text) {
            return Command::Forecast(coords);
        }

        let first_token = text
            .trim()
            .split_whitespace()
            .next()
            .map(|t| t.to_ascii_lowercase());

        match first_token.as_deref() {
            Some("version") => Command::Version,
            Some("auth") => Command::Auth,
            _ => Command::Help,
        }
    }
}
