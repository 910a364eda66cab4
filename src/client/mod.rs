//! # Client Components
//!
//! ## Gateway ([`client`])
//! The request-issuing facade: base URL, timeout, interceptor chains and
//! failure classification.
//!
//! ## Middleware ([`middleware`])
//! Interceptors run around every call:
//! - Bearer token attachment
//! - Session expiry handling (clear credential, redirect to `/login`)
//! - Failure logging
//!
//! ## Session ([`session`])
//! Credential storage and navigation capabilities injected into the gateway.
//!
//! ## Courses ([`courses`])
//! Page-level flow: list, validate, create, reload.

pub mod client;
pub mod courses;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod session;

// Re-export for convenience
pub use client::ApiClient;
pub use courses::{CourseForm, CoursesPage, PageError};
pub use error::{FailureKind, GatewayError};
pub use metrics::ClientMetrics;
