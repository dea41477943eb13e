use std::str::FromStr;

use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use promdemo_core::error::{DemoError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub service: ServiceSection,

    #[serde(default)]
    pub log: LogSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            service: ServiceSection::default(),
            log: LogSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(DemoError::Config(format!("unsupported config version {}", self.version)));
        }
        self.server.validate()?;
        self.log.validate()?;
        if self.service.name.trim().is_empty() {
            return Err(DemoError::Config("service.name must not be empty".into()));
        }
        Ok(())
    }

    /// `host:port` the listener binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(DemoError::Config("server.host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(DemoError::Config("server.port must be between 1 and 65535".into()));
        }
        if !(100..=300_000).contains(&self.request_timeout_ms) {
            return Err(DemoError::Config(
                "server.request_timeout_ms must be between 100 and 300000".into(),
            ));
        }
        Ok(())
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3000
}
fn default_request_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceSection {
    /// Emitted as `service` on every log line.
    #[serde(default = "default_service_name")]
    pub name: String,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self { name: default_service_name() }
    }
}

fn default_service_name() -> String {
    "demo-app".into()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogSection {
    #[serde(default)]
    pub format: LogFormat,

    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LogSection {
    /// `level` is a filter directive list; every directive must end in a level
    /// (`info`, `warn,promdemo_server=debug`), so a typo cannot silence output.
    pub fn validate(&self) -> Result<()> {
        let bad = |why: String| DemoError::Config(format!("log.level {:?}: {why}", self.level));

        if self.level.trim().is_empty() {
            return Err(bad("must not be empty".into()));
        }
        for directive in self.level.split(',').map(str::trim) {
            let level = directive.rsplit_once('=').map_or(directive, |(_, l)| l);
            LevelFilter::from_str(level)
                .map_err(|_| bad(format!("directive {directive:?} does not name a level")))?;
        }
        EnvFilter::try_new(&self.level).map_err(|e| bad(e.to_string()))?;
        Ok(())
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self { format: LogFormat::default(), level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Register the default process collector.
    #[serde(default = "default_true")]
    pub process: bool,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self { process: true }
    }
}

fn default_true() -> bool {
    true
}
