//! Server config loader (strict parsing).
//!
//! Layering: built-in defaults, then the optional YAML file named by
//! `PROMDEMO_CONFIG`, then the `PORT` override, then `validate()`.

pub mod schema;

use std::fs;

use promdemo_core::error::{DemoError, Result};

pub use schema::{LogFormat, LogSection, MetricsSection, ServerConfig, ServerSection, ServiceSection};

/// Env var naming an optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "PROMDEMO_CONFIG";
/// Env var overriding `server.port`.
pub const PORT_ENV: &str = "PORT";

/// Load from the process environment.
pub fn load() -> Result<ServerConfig> {
    load_with_env(|k| std::env::var(k).ok())
}

/// Load with an injected env lookup so tests never touch process-global state.
pub fn load_with_env(env: impl Fn(&str) -> Option<String>) -> Result<ServerConfig> {
    let mut cfg = match env(CONFIG_PATH_ENV).filter(|p| !p.trim().is_empty()) {
        Some(path) => parse_file(&path)?,
        None => ServerConfig::default(),
    };
    if let Some(port) = parse_port(env(PORT_ENV).as_deref())? {
        cfg.server.port = port;
    }
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_file(path: &str) -> Result<ServerConfig> {
    let cfg = parse_file(path)?;
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<ServerConfig> {
    let cfg = parse_str(s)?;
    cfg.validate()?;
    Ok(cfg)
}

fn parse_file(path: &str) -> Result<ServerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| DemoError::Config(format!("read config {path} failed: {e}")))?;
    parse_str(&s)
}

fn parse_str(s: &str) -> Result<ServerConfig> {
    serde_yaml::from_str(s).map_err(|e| DemoError::Config(format!("invalid yaml: {e}")))
}

/// `PORT` policy: unset or blank means "no override"; anything else must be a
/// port number in 1..=65535.
pub fn parse_port(raw: Option<&str>) -> Result<Option<u16>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<u16>() {
        Ok(0) | Err(_) => Err(DemoError::Config(format!(
            "{PORT_ENV} must be an integer between 1 and 65535, got {raw:?}"
        ))),
        Ok(p) => Ok(Some(p)),
    }
}
