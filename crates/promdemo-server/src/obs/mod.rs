//! Observability: structured logging setup.
//!
//! Metrics live in `promdemo_core::metrics`; this module only owns how log
//! events reach stdout.

pub mod logging;
