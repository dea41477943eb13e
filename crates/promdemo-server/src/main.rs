//! promdemo: demo HTTP service exposing Prometheus metrics.
//!
//! - `GET /`        : greeting, counted in `http_requests_total`
//! - `GET /metrics` : text exposition for scraping
//! - Listens on `PORT` (default 3000); JSON logs on stdout

use std::process::ExitCode;

use promdemo_server::{app_state::AppState, config, obs, server};

#[tokio::main]
async fn main() -> ExitCode {
    let cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            obs::logging::init(&config::LogSection::default());
            tracing::error!(error = %e, "config load failed");
            return ExitCode::FAILURE;
        }
    };
    obs::logging::init(&cfg.log);

    let state = match AppState::new(cfg) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "metrics setup failed");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server::run(state).await {
        tracing::error!(error = %e, "server exited with error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
