//! HTTP handlers.
//!
//! - `/`        : greeting, increments `http_requests_total`
//! - `/metrics` : Prometheus text format

pub mod metrics;
pub mod root;
