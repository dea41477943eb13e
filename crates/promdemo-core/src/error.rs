//! Shared error type across promdemo crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Configuration could not be loaded or failed validation.
    BadConfig,
    /// Label set does not match the declared schema.
    BadLabels,
    /// Metric or label name is malformed.
    BadName,
    /// Metric or collector is not registered.
    NotFound,
    /// Metric or collector is already registered.
    AlreadyExists,
    /// A collector failed while sampling.
    CollectFailed,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadConfig => "BAD_CONFIG",
            ClientCode::BadLabels => "BAD_LABELS",
            ClientCode::BadName => "BAD_NAME",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::AlreadyExists => "ALREADY_EXISTS",
            ClientCode::CollectFailed => "COLLECT_FAILED",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, DemoError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("invalid config: {0}")]
    Config(String),
    #[error("label mismatch for {metric}: expected [{expected}], got [{got}]")]
    LabelMismatch {
        metric: String,
        expected: String,
        got: String,
    },
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    #[error("already registered: {0}")]
    AlreadyRegistered(String),
    #[error("collector {collector} failed: {reason}")]
    Collect { collector: String, reason: String },
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal: {0}")]
    Internal(String),
}

impl DemoError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            DemoError::Config(_) => ClientCode::BadConfig,
            DemoError::LabelMismatch { .. } => ClientCode::BadLabels,
            DemoError::InvalidName(_) => ClientCode::BadName,
            DemoError::UnknownMetric(_) => ClientCode::NotFound,
            DemoError::AlreadyRegistered(_) => ClientCode::AlreadyExists,
            DemoError::Collect { .. } => ClientCode::CollectFailed,
            DemoError::Bind { .. } | DemoError::Io(_) | DemoError::Internal(_) => {
                ClientCode::Internal
            }
        }
    }
}
