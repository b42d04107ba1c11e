//! windy.com account API client
//!
//! Handles the login call that issues the two session cookies and the
//! account-info probe that tells us whether stored cookies are still
//! accepted.

use reqwest::header::SET_COOKIE;
use serde::Serialize;
use tracing::{debug, info, warn};

use wx_core::{CredentialStatus, CredentialStore, SessionCookies, SID_COOKIE, SS_COOKIE};

use crate::error::{LoginError, Result};

/// Request body for the login endpoint
#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Client for the windy.com account API
#[derive(Debug, Clone)]
pub struct AccountClient {
    client: reqwest::Client,
    base_url: String,
}

impl AccountClient {
    /// Create a client against the production account API
    pub fn new() -> Result<Self> {
        Self::with_base_url("https://account.windy.com")
    }

    /// Create a client with a custom base URL (configuration or tests)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(LoginError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Log in with email and password, returning the issued session cookies
    ///
    /// A non-success status or a response without both cookies is an error;
    /// the caller decides what to do with previously stored credentials
    /// (the login form leaves them untouched on failure).
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionCookies> {
        let url = format!("{}/api/login", self.base_url);

        debug!("Posting login for {} to {}", email, url);

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(LoginError::Http)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Login rejected with status {}", status);
            return Err(LoginError::Rejected(status.as_u16()));
        }

        let cookie_values: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .collect();

        let cookies = extract_session_cookies(cookie_values.iter().map(String::as_str))
            .ok_or(LoginError::MissingCookies)?;

        info!("Login succeeded, session cookies captured");

        Ok(cookies)
    }

    /// Probe the account-info endpoint with the given cookies
    ///
    /// Returns whether the endpoint accepted them (HTTP 200).
    pub async fn probe(&self, cookies: &SessionCookies) -> Result<bool> {
        let url = format!("{}/api/info", self.base_url);

        debug!("Probing account info at {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::COOKIE, cookies.header_value())
            .send()
            .await
            .map_err(LoginError::Http)?;

        Ok(response.status() == reqwest::StatusCode::OK)
    }

    /// Check the credentials in the store against the account API
    ///
    /// A rejected or failed probe clears the store: stale cookies must not
    /// linger once they stop working.
    pub async fn check(&self, store: &CredentialStore) -> CredentialStatus {
        let Some(cookies) = store.get().await else {
            return CredentialStatus::Absent;
        };

        match self.probe(&cookies).await {
            Ok(true) => CredentialStatus::Valid,
            Ok(false) => {
                info!("Stored session cookies rejected, clearing them");
                store.clear().await;
                CredentialStatus::Invalid
            }
            Err(e) => {
                warn!("Account probe failed ({}), clearing stored cookies", e);
                store.clear().await;
                CredentialStatus::Invalid
            }
        }
    }
}

/// Pick the two session cookies out of `Set-Cookie` header values
fn extract_session_cookies<'a>(
    values: impl Iterator<Item = &'a str>,
) -> Option<SessionCookies> {
    let mut sid = None;
    let mut ss = None;

    for value in values {
        let pair = value.split(';').next().unwrap_or_default();
        let Some((name, cookie_value)) = pair.split_once('=') else {
            continue;
        };

        match name.trim() {
            SID_COOKIE => sid = Some(cookie_value.to_string()),
            SS_COOKIE => ss = Some(cookie_value.to_string()),
            _ => {}
        }
    }

    Some(SessionCookies {
        sid: sid?,
        ss: ss?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::Router;
    use axum::http::StatusCode;
    use axum::response::{AppendHeaders, IntoResponse};
    use axum::routing::{get, post};

    #[test]
    fn test_extract_session_cookies() {
        let values = [
            "_account_sid=sid123; Path=/; HttpOnly",
            "_account_ss=ss456; Path=/; Secure",
        ];
        let cookies = extract_session_cookies(values.iter().copied()).unwrap();
        assert_eq!(cookies.sid, "sid123");
        assert_eq!(cookies.ss, "ss456");
    }

    #[test]
    fn test_extract_ignores_unrelated_cookies() {
        let values = [
            "tracking=xyz; Path=/",
            "_account_ss=ss456",
            "_account_sid=sid123",
        ];
        let cookies = extract_session_cookies(values.iter().copied()).unwrap();
        assert_eq!(cookies.sid, "sid123");
        assert_eq!(cookies.ss, "ss456");
    }

    #[test]
    fn test_extract_requires_both_cookies() {
        let values = ["_account_sid=sid123; Path=/"];
        assert!(extract_session_cookies(values.iter().copied()).is_none());
        assert!(extract_session_cookies(std::iter::empty()).is_none());
    }

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn stub_login_ok() -> Router {
        Router::new().route(
            "/api/login",
            post(|| async {
                AppendHeaders([
                    (axum::http::header::SET_COOKIE, "_account_sid=sid123; Path=/"),
                    (axum::http::header::SET_COOKIE, "_account_ss=ss456; Path=/"),
                ])
                .into_response()
            }),
        )
    }

    #[tokio::test]
    async fn test_login_captures_cookies() {
        let base = spawn_stub(stub_login_ok()).await;
        let client = AccountClient::with_base_url(&base).unwrap();

        let cookies = client.login("user@example.com", "hunter2").await.unwrap();
        assert_eq!(cookies.sid, "sid123");
        assert_eq!(cookies.ss, "ss456");
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let router = Router::new().route(
            "/api/login",
            post(|| async { StatusCode::UNAUTHORIZED.into_response() }),
        );
        let base = spawn_stub(router).await;
        let client = AccountClient::with_base_url(&base).unwrap();

        let err = client.login("user@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, LoginError::Rejected(401)));
    }

    #[tokio::test]
    async fn test_login_without_cookies_is_error() {
        let router = Router::new().route("/api/login", post(|| async { "ok" }));
        let base = spawn_stub(router).await;
        let client = AccountClient::with_base_url(&base).unwrap();

        let err = client.login("user@example.com", "hunter2").await.unwrap_err();
        assert!(matches!(err, LoginError::MissingCookies));
    }

    #[tokio::test]
    async fn test_check_absent() {
        let client = AccountClient::with_base_url("http://127.0.0.1:1").unwrap();
        let store = CredentialStore::new();

        assert_eq!(client.check(&store).await, CredentialStatus::Absent);
    }

    #[tokio::test]
    async fn test_check_valid() {
        let router = Router::new().route("/api/info", get(|| async { "{}" }));
        let base = spawn_stub(router).await;
        let client = AccountClient::with_base_url(&base).unwrap();

        let store = CredentialStore::new();
        store.set(SessionCookies::new("sid123", "ss456")).await;

        assert_eq!(client.check(&store).await, CredentialStatus::Valid);
        // A valid probe leaves the cookies in place
        assert!(!store.is_empty().await);
    }

    #[tokio::test]
    async fn test_check_invalid_clears_store() {
        let router = Router::new().route(
            "/api/info",
            get(|| async { StatusCode::UNAUTHORIZED.into_response() }),
        );
        let base = spawn_stub(router).await;
        let client = AccountClient::with_base_url(&base).unwrap();

        let store = CredentialStore::new();
        store.set(SessionCookies::new("stale", "stale")).await;

        assert_eq!(client.check(&store).await, CredentialStatus::Invalid);
        assert!(store.is_empty().await);

        // The cleared store now reports absent
        assert_eq!(client.check(&store).await, CredentialStatus::Absent);
    }

    #[tokio::test]
    async fn test_check_unreachable_clears_store() {
        // Nothing listens on port 1; the probe fails at the transport level
        let client = AccountClient::with_base_url("http://127.0.0.1:1").unwrap();

        let store = CredentialStore::new();
        store.set(SessionCookies::new("sid", "ss")).await;

        assert_eq!(client.check(&store).await, CredentialStatus::Invalid);
        assert!(store.is_empty().await);
    }
}
