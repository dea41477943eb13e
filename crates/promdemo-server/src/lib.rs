//! promdemo server library entry.
//!
//! Wires config, logging, the metrics registry, and the two HTTP routes into
//! an axum application. Consumed by the binary (`main.rs`) and by integration
//! tests.

pub mod app_state;
pub mod config;
pub mod error;
pub mod handlers;
pub mod obs;
pub mod router;
pub mod server;
