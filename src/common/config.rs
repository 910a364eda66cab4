//! # Configuration
//!
//! Resolution of the backend base URL plus the TOML settings file shared by
//! the library and the client binary.
//!
//! ## Base URL rules
//!
//! - absent or empty → `/api` (same origin, relative)
//! - exactly `/api` → unchanged
//! - `http://` or `https://` → trailing slashes stripped, `/api` appended
//!   unless already present
//! - anything else → treated as a bare host and prefixed with `https://`
//!   (permissive policy) or rejected (strict policy)
//!
//! The resolved [`ApiConfig`] is built once at startup and handed to
//! [`ApiClient::new`](crate::client::ApiClient::new) by reference.

use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the backend base URL.
pub const API_URL_ENV: &str = "STUDY_COACH_API_URL";

/// Base URL used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "/api";

/// Origin used to anchor a relative base URL (the backend's dev address).
pub const DEFAULT_ORIGIN: &str = "http://localhost:5000";

/// Request timeout applied to every call.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Example
/// ```ignore
/// let settings: ClientSettings = load_config("config/client.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Errors raised while resolving the gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("base URL '{value}' has no http:// or https:// scheme")]
    MissingScheme { value: String },

    #[error("base URL '{value}' is not a valid URL: {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("base URL '{base}' is relative and no origin is configured")]
    RelativeBaseWithoutOrigin { base: String },
}

/// How to treat a base URL that carries no scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BaseUrlPolicy {
    /// Assume `https://` and log a warning.
    #[default]
    Permissive,
    /// Refuse to start.
    Strict,
}

/// Resolve a raw base URL value into the prefix used for every request.
pub fn resolve_base_url(raw: Option<&str>, policy: BaseUrlPolicy) -> Result<String, ConfigError> {
    let raw = match raw {
        Some(value) if !value.is_empty() => value,
        _ => return Ok(DEFAULT_BASE_URL.to_string()),
    };

    if raw == DEFAULT_BASE_URL {
        return Ok(raw.to_string());
    }

    let absolute = if has_http_scheme(raw) {
        raw.to_string()
    } else {
        match policy {
            BaseUrlPolicy::Permissive => {
                warn!(
                    "⚠️  {} value '{}' doesn't start with http:// or https://. Assuming https://",
                    API_URL_ENV, raw
                );
                format!("https://{}", raw.trim_start_matches('/'))
            }
            BaseUrlPolicy::Strict => {
                return Err(ConfigError::MissingScheme {
                    value: raw.to_string(),
                })
            }
        }
    };

    let mut resolved = absolute.trim_end_matches('/').to_string();
    if !resolved.ends_with("/api") {
        resolved.push_str("/api");
    }

    if policy == BaseUrlPolicy::Strict {
        reqwest::Url::parse(&resolved).map_err(|e| ConfigError::InvalidUrl {
            value: raw.to_string(),
            reason: e.to_string(),
        })?;
    }

    Ok(resolved)
}

pub(crate) fn has_http_scheme(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Join a request path onto a base URL.
///
/// Absolute `http(s)://` paths bypass the base entirely.
pub fn join_url(base: &str, path: &str) -> String {
    if has_http_scheme(path) {
        return path.to_string();
    }
    if path.is_empty() {
        return base.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Immutable gateway configuration, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Resolved base URL, e.g. `/api` or `https://backend.example.com/api`
    pub base_url: String,
    /// Origin that anchors a relative base URL
    pub origin: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Resolve a raw base URL value with the default timeout and no origin.
    pub fn resolve(raw: Option<&str>, policy: BaseUrlPolicy) -> Result<Self, ConfigError> {
        let base_url = resolve_base_url(raw, policy)?;
        info!("🌐 API base URL: {}", base_url);

        Ok(Self {
            base_url,
            origin: None,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        })
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// True when the base URL has no scheme and needs an origin.
    pub fn is_relative(&self) -> bool {
        !has_http_scheme(&self.base_url)
    }

    /// The absolute prefix requests are issued against.
    pub fn endpoint_base(&self) -> Result<String, ConfigError> {
        if !self.is_relative() {
            return Ok(self.base_url.clone());
        }

        match &self.origin {
            Some(origin) => Ok(join_url(origin, &self.base_url)),
            None => Err(ConfigError::RelativeBaseWithoutOrigin {
                base: self.base_url.clone(),
            }),
        }
    }
}

/// Client settings file.
///
/// # Example TOML
///
/// ```toml
/// [api]
/// base_url = "https://backend.example.com"
/// origin = "http://localhost:5000"
/// timeout_ms = 30000
/// strict_base_url = false
///
/// [session]
/// path = "user-data/session.json"
/// current_path = "/courses"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientSettings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

/// `[api]` table of the settings file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Used when `STUDY_COACH_API_URL` is not set
    pub base_url: Option<String>,
    pub origin: Option<String>,
    pub timeout_ms: Option<u64>,
    /// Fail at startup instead of guessing `https://`
    #[serde(default)]
    pub strict_base_url: bool,
}

/// `[session]` table of the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// File backing the credential store
    pub path: String,
    /// Page the client considers itself on when a 401 arrives
    pub current_path: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            path: "user-data/session.json".to_string(),
            current_path: "/courses".to_string(),
        }
    }
}

impl ClientSettings {
    pub fn from_file(path: &str) -> Result<Self> {
        load_config(path)
    }

    pub fn policy(&self) -> BaseUrlPolicy {
        if self.api.strict_base_url {
            BaseUrlPolicy::Strict
        } else {
            BaseUrlPolicy::Permissive
        }
    }

    /// Build the gateway configuration. `env_value` wins over the file.
    pub fn api_config(&self, env_value: Option<&str>) -> Result<ApiConfig, ConfigError> {
        let raw = env_value
            .filter(|v| !v.is_empty())
            .or(self.api.base_url.as_deref());

        let origin = self
            .api
            .origin
            .clone()
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());
        let timeout = Duration::from_millis(self.api.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS));

        Ok(ApiConfig::resolve(raw, self.policy())?
            .with_origin(origin)
            .with_timeout(timeout))
    }
}
