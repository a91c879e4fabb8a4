//! HTTP client for the district prediction service.
//!
//! - **Simulation**: `POST /simulate` with the CSV and mapping as multipart
//!   form fields, returning the raw response tree
//! - **Dashboard**: typed fetchers for the forecast, cluster, anomaly,
//!   insight and report endpoints, plus the health check
//! - **Errors**: [`ClientError::user_message`] yields the service's own
//!   `error` text or the generic "Server connection failed."
//!
//! Requests are blocking, with a configurable timeout. Only one request is
//! ever in flight per call.

mod client;
mod config;
mod endpoints;
mod error;

pub use client::ApiClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{ClientError, GENERIC_FAILURE, Result, extract_error_message};
