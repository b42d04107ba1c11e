//! Coordinate extraction from chat input
//!
//! Two input shapes are supported: structured location payloads carrying a
//! `geo:<lat>,<lon>` URI, and free text containing a space-separated pair
//! of signed decimals anywhere in the message.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static GEO_URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^geo:(-?\d+(?:\.\d+)?),(-?\d+(?:\.\d+)?)").unwrap());

static TEXT_PAIR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-?\d+(?:\.\d+)?) (-?\d+(?:\.\d+)?)").unwrap());

/// A latitude/longitude pair parsed from chat input
///
/// No range validation is applied beyond the regex shape; windy.com accepts
/// arbitrary decimals in its forecast URLs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Parse a `geo:<lat>,<lon>` URI
    ///
    /// Trailing URI components (altitude, `;u=` accuracy) are ignored.
    /// Malformed input yields `None` so the caller can report a parse
    /// failure instead of aborting the request.
    pub fn from_geo_uri(uri: &str) -> Option<Self> {
        let caps = GEO_URI_RE.captures(uri.trim())?;
        Self::from_captures(&caps)
    }

    /// Find the first `<lat> <lon>` pair anywhere in a text message
    pub fn find_in_text(text: &str) -> Option<Self> {
        let caps = TEXT_PAIR_RE.captures(text)?;
        Self::from_captures(&caps)
    }

    fn from_captures(caps: &regex::Captures<'_>) -> Option<Self> {
        let latitude: f64 = caps.get(1)?.as_str().parse().ok()?;
        let longitude: f64 = caps.get(2)?.as_str().parse().ok()?;
        Some(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}
