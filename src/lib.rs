pub mod cli;
pub mod client;
pub mod common;
pub mod utils;

pub use client::{ApiClient, GatewayError};
pub use common::config::ApiConfig;
pub use common::models::Course;
