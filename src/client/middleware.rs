//! # Client Middleware
//!
//! Hooks run by [`ApiClient`](super::ApiClient) around every round trip.
//!
//! ## Request side
//!
//! [`RequestInterceptor`]s run in registration order on the fully built
//! request, just before it is sent. The first one to fail aborts the call
//! with [`GatewayError::Interceptor`]; nothing goes on the wire.
//!
//! [`AuthInterceptor`] attaches `Authorization: Bearer <token>` whenever the
//! credential store holds a token.
//!
//! ## Response side
//!
//! [`ResponseInterceptor`]s observe every outcome. Successes pass through
//! untouched. Failures are observed and then still returned to the caller;
//! an interceptor can react (clear state, navigate) but never swallow.
//!
//! [`SessionGuard`] logs each failure by kind and, on HTTP 401, clears the
//! session and sends the client to `/login` unless it is already on the
//! login or registration page.

use log::{error, info, warn};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Request, StatusCode};
use std::sync::Arc;

use super::error::GatewayError;
use super::session::{self, CredentialStore, Navigator, LOGIN_PATH};

/// Hook run on every outgoing request.
pub trait RequestInterceptor: Send + Sync {
    fn on_request(&self, request: &mut Request) -> Result<(), GatewayError>;
}

/// Hook run on every outcome.
pub trait ResponseInterceptor: Send + Sync {
    fn on_success(&self, _status: StatusCode) {}

    fn on_failure(&self, error: &GatewayError);
}

/// Attaches the stored bearer token to outgoing requests.
pub struct AuthInterceptor {
    store: Arc<dyn CredentialStore>,
}

impl AuthInterceptor {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }
}

impl RequestInterceptor for AuthInterceptor {
    fn on_request(&self, request: &mut Request) -> Result<(), GatewayError> {
        let token = session::access_token(self.store.as_ref()).map_err(|e| {
            GatewayError::Interceptor {
                message: format!("failed to read credential: {}", e),
            }
        })?;

        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| {
                GatewayError::Interceptor {
                    message: format!("stored credential is not a valid header value: {}", e),
                }
            })?;
            value.set_sensitive(true);
            request.headers_mut().insert(AUTHORIZATION, value);
        }

        Ok(())
    }
}

/// Reacts to failed calls: logging for all, session cleanup for 401.
pub struct SessionGuard {
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    /// Included in network failure logs
    base_url: String,
}

impl SessionGuard {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            navigator,
            base_url: base_url.into(),
        }
    }

    fn expire_session(&self) {
        if let Err(e) = session::clear_session(self.store.as_ref()) {
            error!("❌ Failed to clear expired session: {}", e);
        }

        let current = self.navigator.current_path();
        if session::is_auth_page(&current) {
            info!("Session rejected on '{}', already on an auth page", current);
            return;
        }

        warn!("🔒 Session rejected on '{}', redirecting to {}", current, LOGIN_PATH);
        self.navigator.redirect(LOGIN_PATH);
    }
}

impl ResponseInterceptor for SessionGuard {
    fn on_failure(&self, err: &GatewayError) {
        match err {
            GatewayError::Http { status, body } => {
                error!(
                    "API Error: {} {}",
                    status,
                    body.as_deref().unwrap_or("<empty body>")
                );
                if err.is_unauthorized() {
                    self.expire_session();
                }
            }
            GatewayError::Network { .. } | GatewayError::Timeout { .. } => {
                error!("API Error: {}", err);
                error!("Network error - is backend accessible? {}", self.base_url);
            }
            _ => error!("API Error: {}", err),
        }
    }
}
