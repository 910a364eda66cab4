//! Classified gateway failures.
//!
//! Every call through [`ApiClient`](super::ApiClient) resolves to either the
//! parsed payload or one of these variants, so callers can match on the
//! failure kind instead of inspecting raw statuses.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::common::config::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// A request interceptor failed; the request was never sent.
    #[error("request interceptor failed: {message}")]
    Interceptor { message: String },

    #[error("failed to encode request body: {message}")]
    Encode { message: String },

    /// No response at all (DNS, connection refused, offline).
    #[error("network error contacting {url}: {message}")]
    Network { url: String, message: String },

    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    /// The backend answered with a non-success status.
    #[error("HTTP {status}{}", body_suffix(.body))]
    Http { status: u16, body: Option<String> },

    #[error("failed to parse response body: {message}")]
    Parse { message: String },
}

fn body_suffix(body: &Option<String>) -> String {
    match body {
        Some(body) => format!(": {}", body),
        None => String::new(),
    }
}

/// Flat classification of a [`GatewayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Bad configuration, URL or body; detected before sending
    Request,
    Interceptor,
    Network,
    Timeout,
    HttpStatus,
    Parse,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Request => "request",
            FailureKind::Interceptor => "interceptor",
            FailureKind::Network => "network",
            FailureKind::Timeout => "timeout",
            FailureKind::HttpStatus => "http_status",
            FailureKind::Parse => "parse",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GatewayError {
    pub fn kind(&self) -> FailureKind {
        match self {
            GatewayError::Config(_)
            | GatewayError::InvalidUrl { .. }
            | GatewayError::Encode { .. } => FailureKind::Request,
            GatewayError::Interceptor { .. } => FailureKind::Interceptor,
            GatewayError::Network { .. } => FailureKind::Network,
            GatewayError::Timeout { .. } => FailureKind::Timeout,
            GatewayError::Http { .. } => FailureKind::HttpStatus,
            GatewayError::Parse { .. } => FailureKind::Parse,
        }
    }

    /// HTTP status, when the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// True when no response was received.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GatewayError::Network { .. } | GatewayError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let unauthorized = GatewayError::Http {
            status: 401,
            body: None,
        };
        assert_eq!(unauthorized.kind(), FailureKind::HttpStatus);
        assert!(unauthorized.is_unauthorized());
        assert!(!unauthorized.is_transport());

        let timeout = GatewayError::Timeout {
            url: "http://h/api/courses".to_string(),
            timeout_ms: 30_000,
        };
        assert_eq!(timeout.kind(), FailureKind::Timeout);
        assert_eq!(timeout.status(), None);
        assert!(timeout.is_transport());

        let config = GatewayError::from(ConfigError::MissingScheme {
            value: "x".to_string(),
        });
        assert_eq!(config.kind(), FailureKind::Request);
    }

    #[test]
    fn test_http_display_includes_body() {
        let err = GatewayError::Http {
            status: 500,
            body: Some("boom".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");

        let err = GatewayError::Http {
            status: 404,
            body: None,
        };
        assert_eq!(err.to_string(), "HTTP 404");
    }
}
