//! promdemo core: the in-process metrics registry, its exposition encoder, and
//! the shared error surface.
//!
//! This crate carries no HTTP or runtime dependencies so the registry can be
//! exercised directly from unit tests and reused outside the server binary.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths surface as `DemoError`/`Result` so a bad scrape or a bad
//! label set never takes the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{Result, DemoError};
