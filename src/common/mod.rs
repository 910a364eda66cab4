//! # Common Components
//!
//! Shared configuration and data structures used by the gateway, the courses
//! page and the client binary.
//!
//! ## Modules
//!
//! - [`config`]: Base URL resolution and the TOML settings file
//! - [`models`]: Course and request/response bodies exchanged with the backend

pub mod config;
pub mod models;
