//! `tracing` subscriber construction.
//!
//! JSON mode writes one object per event with the event fields flattened to
//! the top level (`timestamp`, `level`, `message`, `target`, plus whatever the
//! call site records, e.g. `service`, `method`, `path`). Span context is
//! omitted so each line stands alone for a log collector.

use tracing::Subscriber;
use tracing_subscriber::{fmt, fmt::MakeWriter, EnvFilter};

use crate::config::{LogFormat, LogSection};

/// `RUST_LOG` wins; otherwise the configured level.
pub fn env_filter(cfg: &LogSection) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.level))
}

/// Build a subscriber writing to `writer`. Tests pass a capturing writer.
pub fn subscriber<W>(format: LogFormat, filter: EnvFilter, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => Box::new(
            fmt()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_span_list(false)
                .with_env_filter(filter)
                .with_writer(writer)
                .finish(),
        ),
        LogFormat::Pretty => Box::new(
            fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .finish(),
        ),
    }
}

/// Install the process-wide subscriber writing to stdout.
pub fn init(cfg: &LogSection) {
    let sub = subscriber(cfg.format, env_filter(cfg), std::io::stdout);
    if tracing::subscriber::set_global_default(sub).is_err() {
        tracing::warn!("global tracing subscriber already installed");
    }
}
