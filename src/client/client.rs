//! # API Client
//!
//! The single request-issuing facade used by every page.
//!
//! ## Responsibility
//!
//! [`ApiClient`] owns the resolved configuration and a pooled `reqwest`
//! client. For each call it:
//! 1. Joins the path onto the base URL
//! 2. Runs the request interceptors (auth header)
//! 3. Sends the request with the configured timeout
//! 4. Classifies the outcome into a payload or a [`GatewayError`]
//! 5. Lets the response interceptors observe it (401 handling, logging)
//!
//! There is no retry, pagination or caching: every call is one round trip.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let settings = ClientSettings::from_file("config/client.toml")?;
//! let config = settings.api_config(std::env::var(API_URL_ENV).ok().as_deref())?;
//! let store = Arc::new(FileStore::new("user-data/session.json"));
//! let navigator = Arc::new(RecordingNavigator::at("/courses"));
//!
//! let api = ApiClient::with_session(&config, store, navigator)?;
//! let courses: Vec<Course> = api.list("/courses").await?;
//! ```

use log::{debug, warn};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::error::GatewayError;
use super::metrics::ClientMetrics;
use super::middleware::{AuthInterceptor, RequestInterceptor, ResponseInterceptor, SessionGuard};
use super::session::{CredentialStore, Navigator};
use crate::common::config::{join_url, ApiConfig};
use crate::common::models::HealthStatus;

/// Configured HTTP gateway to the course backend.
///
/// Cloning is cheap; clones share the connection pool, interceptors and
/// metrics.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
    /// Absolute prefix every path is joined onto
    endpoint_base: String,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
    metrics: Option<Arc<Mutex<ClientMetrics>>>,
}

impl ApiClient {
    /// Build a gateway with no interceptors.
    ///
    /// # Errors
    ///
    /// * [`GatewayError::Config`] - relative base URL without an origin
    /// * [`GatewayError::InvalidUrl`] - the base does not parse, or the
    ///   HTTP client cannot be built
    pub fn new(config: &ApiConfig) -> Result<Self, GatewayError> {
        let endpoint_base = config.endpoint_base()?;
        Url::parse(&endpoint_base).map_err(|e| GatewayError::InvalidUrl {
            url: endpoint_base.clone(),
            reason: e.to_string(),
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::InvalidUrl {
                url: endpoint_base.clone(),
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        debug!(
            "API client ready: base={}, timeout={}ms",
            endpoint_base,
            config.timeout.as_millis()
        );

        Ok(Self {
            http,
            config: config.clone(),
            endpoint_base,
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
            metrics: None,
        })
    }

    /// Build the standard gateway: bearer auth on the way out, session
    /// expiry handling on the way back.
    pub fn with_session(
        config: &ApiConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, GatewayError> {
        let client = Self::new(config)?;
        let guard = SessionGuard::new(store.clone(), navigator, client.endpoint_base.clone());

        Ok(client
            .with_request_interceptor(Arc::new(AuthInterceptor::new(store)))
            .with_response_interceptor(Arc::new(guard)))
    }

    pub fn with_request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    pub fn with_response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptors.push(interceptor);
        self
    }

    /// Record every call into `metrics`.
    pub fn with_metrics(mut self, metrics: Arc<Mutex<ClientMetrics>>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// The absolute prefix requests are issued against.
    pub fn base_url(&self) -> &str {
        &self.endpoint_base
    }

    /// Absolute URL for `path`.
    pub fn url_for(&self, path: &str) -> Result<Url, GatewayError> {
        let joined = join_url(&self.endpoint_base, path);
        Url::parse(&joined).map_err(|e| GatewayError::InvalidUrl {
            url: joined,
            reason: e.to_string(),
        })
    }

    /// `GET path`, parsed as `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.dispatch(Method::GET, path, None).await
    }

    /// `POST path` with a JSON body, parsed as `T`.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_vec(body).map_err(|e| GatewayError::Encode {
            message: e.to_string(),
        })?;
        self.dispatch(Method::POST, path, Some(body)).await
    }

    /// `GET path`, parsed as a JSON array.
    pub async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, GatewayError> {
        self.get(path).await
    }

    /// `POST path` with `body`, parsed as the created entity.
    pub async fn create<B, T>(&self, path: &str, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(path, body).await
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<HealthStatus, GatewayError> {
        self.get("/health").await
    }

    async fn dispatch<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<T, GatewayError> {
        let started = Instant::now();
        let result = self.round_trip(method.clone(), path, body).await;

        match &result {
            Ok((status, _)) => {
                for interceptor in &self.response_interceptors {
                    interceptor.on_success(*status);
                }
            }
            Err(err) => {
                for interceptor in &self.response_interceptors {
                    interceptor.on_failure(err);
                }
            }
        }

        if let Some(metrics) = &self.metrics {
            let (status, failure) = match &result {
                Ok((status, _)) => (Some(status.as_u16()), None),
                Err(err) => (err.status(), Some(err.kind())),
            };
            match metrics.lock() {
                Ok(mut metrics) => {
                    metrics.record_request(method.as_str(), path, started.elapsed(), status, failure)
                }
                Err(_) => warn!("⚠️  Metrics lock poisoned, dropping record for {} {}", method, path),
            }
        }

        result.map(|(_, payload)| payload)
    }

    async fn round_trip<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<(StatusCode, T), GatewayError> {
        let url = self.url_for(path)?;
        debug!("➡️  {} {}", method, url);

        let mut builder = self.http.request(method, url.clone());
        if let Some(body) = body {
            builder = builder
                .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                .body(body);
        }
        let mut request = builder.build().map_err(|e| GatewayError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        for interceptor in &self.request_interceptors {
            interceptor.on_request(&mut request)?;
        }

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| self.classify(&url, e))?;

        let status = response.status();
        debug!("⬅️  {} {}", status.as_u16(), url);

        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            return Err(GatewayError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(&url, e))?;
        let payload = serde_json::from_slice(&bytes).map_err(|e| GatewayError::Parse {
            message: e.to_string(),
        })?;

        Ok((status, payload))
    }

    /// Map a transport error to a timeout or network failure.
    fn classify(&self, url: &Url, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout {
                url: url.to_string(),
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            GatewayError::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}
