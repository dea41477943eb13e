//! In-process metrics (Prometheus text exposition).
//!
//! Counters are stored as atomics behind `DashMap` shards and rendered on
//! demand by the `/metrics` handler. Collectors produce samples at scrape time.

pub mod counter;
pub mod exposition;
pub mod process;
pub mod registry;

use crate::error::{DemoError, Result};

pub use counter::CounterVec;
pub use process::ProcessCollector;
pub use registry::Registry;

/// Metric type as announced by `# TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// Sample value. Counters stay integral; collector gauges may be fractional.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Int(u64),
    Float(f64),
}

/// One series: ordered label pairs plus its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub labels: Vec<(String, String)>,
    pub value: Value,
}

/// Point-in-time snapshot of a metric family.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricFamily {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub samples: Vec<Sample>,
}

impl MetricFamily {
    /// Single unlabeled gauge sample.
    pub fn gauge(name: &str, help: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            kind: MetricKind::Gauge,
            samples: vec![Sample { labels: Vec::new(), value: Value::Float(value) }],
        }
    }

    /// Single unlabeled counter sample with a fractional value (e.g. CPU seconds).
    pub fn counter_f64(name: &str, help: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            kind: MetricKind::Counter,
            samples: vec![Sample { labels: Vec::new(), value: Value::Float(value) }],
        }
    }
}

/// Scrape-time source of metric families.
///
/// Implementations must be cheap enough to run on every scrape. An `Err`
/// aborts the whole render.
pub trait Collector: Send + Sync {
    /// Unique collector name within a registry.
    fn name(&self) -> &str;
    fn collect(&self) -> Result<Vec<MetricFamily>>;
}

/// `[a-zA-Z_:][a-zA-Z0-9_:]*`
pub(crate) fn validate_metric_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let ok = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(DemoError::InvalidName(format!("metric name {name:?}")))
    }
}

/// `[a-zA-Z_][a-zA-Z0-9_]*`, reserved `__` prefix rejected.
pub(crate) fn validate_label_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let ok = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if !ok || name.starts_with("__") {
        return Err(DemoError::InvalidName(format!("label name {name:?}")));
    }
    Ok(())
}
