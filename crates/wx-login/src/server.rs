//! Login form server
//!
//! Small axum server exposing `GET /login` (the form) and `POST /login`
//! (forwards the credentials to windy.com and captures the session cookies
//! into the shared store).

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Form, State};
use axum::response::Html;
use axum::routing::get;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use wx_core::{CredentialStore, LoginConfig};

use crate::api::AccountClient;
use crate::error::{LoginError, Result};
use crate::pages;

/// Shared state for the login handlers
#[derive(Clone)]
pub struct LoginState {
    pub account: Arc<AccountClient>,
    pub store: CredentialStore,
}

/// Submitted form fields
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login form server
pub struct LoginServer {
    config: LoginConfig,
    state: LoginState,
}

impl LoginServer {
    /// Create a new login server
    pub fn new(config: LoginConfig, account: Arc<AccountClient>, store: CredentialStore) -> Self {
        Self {
            config,
            state: LoginState { account, store },
        }
    }

    /// Get the socket address to bind
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        addr.parse()
            .map_err(|e| LoginError::Config(format!("Invalid address {}: {}", addr, e)))
    }

    /// Get the router
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Start the server
    pub async fn run(self) -> Result<()> {
        let addr = self.socket_addr()?;
        let app = self.router();

        info!("Login server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| LoginError::Server(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| LoginError::Server(format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// Create the login router
pub fn create_router(state: LoginState) -> Router {
    Router::new()
        .route("/login", get(login_form).post(login_submit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the login form
async fn login_form() -> Html<&'static str> {
    Html(pages::LOGIN_FORM_HTML)
}

/// Forward submitted credentials to windy.com
///
/// On success the captured session cookies replace whatever the store
/// held; on failure the previous credentials stay untouched and a generic
/// failure page is returned.
async fn login_submit(
    State(state): State<LoginState>,
    Form(form): Form<LoginForm>,
) -> Html<&'static str> {
    match state.account.login(&form.email, &form.password).await {
        Ok(cookies) => {
            state.store.set(cookies).await;
            info!("Captured windy.com session cookies via login form");
            Html(pages::LOGIN_SUCCESS_HTML)
        }
        Err(e) => {
            warn!("Login form submission failed: {}", e);
            Html(pages::LOGIN_FAILURE_HTML)
        }
    }
}
