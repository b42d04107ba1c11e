//! Shared store for windy.com session cookies
//!
//! The scraper reads the cookies, the login gateway writes them and the
//! account probe clears them when they stop working. All access goes
//! through one RwLock so concurrent logins and probes cannot interleave
//! half-written state.

use std::sync::Arc;
use tokio::sync::RwLock;

/// Cookie name carrying the windy.com session id
pub const SID_COOKIE: &str = "_account_sid";
/// Cookie name carrying the windy.com session secret
pub const SS_COOKIE: &str = "_account_ss";

/// Validity of the stored session cookies, as reported by the account probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    /// No cookies stored
    Absent,
    /// Probe accepted the cookies
    Valid,
    /// Probe rejected the cookies; the store has been cleared
    Invalid,
}

/// The two opaque session cookies issued by the windy.com login API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCookies {
    pub sid: String,
    pub ss: String,
}

impl SessionCookies {
    pub fn new(sid: impl Into<String>, ss: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            ss: ss.into(),
        }
    }

    /// Render as a `Cookie` request header value
    pub fn header_value(&self) -> String {
        format!("{}={}; {}={}", SID_COOKIE, self.sid, SS_COOKIE, self.ss)
    }
}

/// In-memory credential store shared between the login server and the bot
///
/// Cloning shares the underlying state. Nothing is persisted; a process
/// restart requires a fresh login.
#[derive(Debug, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Option<SessionCookies>>>,
}

impl CredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Replace the stored cookies
    pub async fn set(&self, cookies: SessionCookies) {
        let mut guard = self.inner.write().await;
        *guard = Some(cookies);
    }

    /// Get a copy of the stored cookies, if any
    pub async fn get(&self) -> Option<SessionCookies> {
        let guard = self.inner.read().await;
        guard.clone()
    }

    /// Drop the stored cookies
    pub async fn clear(&self) {
        let mut guard = self.inner.write().await;
        *guard = None;
    }

    /// Whether no cookies are stored
    pub async fn is_empty(&self) -> bool {
        let guard = self.inner.read().await;
        guard.is_none()
    }
}

impl Clone for CredentialStore {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_starts_empty() {
        let store = CredentialStore::new();
        assert!(store.is_empty().await);
        assert!(store.get().await.is_none());
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = CredentialStore::new();
        store.set(SessionCookies::new("sid-1", "ss-1")).await;

        let cookies = store.get().await.unwrap();
        assert_eq!(cookies.sid, "sid-1");
        assert_eq!(cookies.ss, "ss-1");
    }

    #[tokio::test]
    async fn test_clear() {
        let store = CredentialStore::new();
        store.set(SessionCookies::new("sid-1", "ss-1")).await;
        store.clear().await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let store = CredentialStore::new();
        let other = store.clone();

        store.set(SessionCookies::new("sid-1", "ss-1")).await;
        assert!(!other.is_empty().await);

        other.clear().await;
        assert!(store.is_empty().await);
    }

    #[test]
    fn test_header_value() {
        let cookies = SessionCookies::new("abc", "def");
        assert_eq!(cookies.header_value(), "_account_sid=abc; _account_ss=def");
    }
}
