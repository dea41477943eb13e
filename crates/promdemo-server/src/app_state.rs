//! Shared application state.
//!
//! Owns the config and the metrics registry. Cloned into every handler via
//! axum's `State` extractor; the registry itself is behind an `Arc`.

use std::sync::Arc;

use promdemo_core::error::Result;
use promdemo_core::metrics::{CounterVec, Registry};

use crate::config::ServerConfig;

/// Name of the request counter exposed on `/metrics`.
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: ServerConfig,
    registry: Arc<Registry>,
    http_requests: Arc<CounterVec>,
}

impl AppState {
    /// Build application state with a fresh registry.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        Self::with_registry(cfg, Arc::new(Registry::new()))
    }

    /// Build application state around a caller-supplied registry
    /// (extra collectors can be attached before or after).
    pub fn with_registry(cfg: ServerConfig, registry: Arc<Registry>) -> Result<Self> {
        if cfg.metrics.process {
            registry.collect_default_process_metrics()?;
        }
        let http_requests = registry.register_counter(
            HTTP_REQUESTS_TOTAL,
            "Total number of HTTP requests",
            &["method", "status"],
        )?;

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, registry, http_requests }),
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn service(&self) -> &str {
        &self.inner.cfg.service.name
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.inner.registry)
    }

    pub fn http_requests(&self) -> &CounterVec {
        &self.inner.http_requests
    }
}
