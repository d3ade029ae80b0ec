//! Subscriber setup and per-request logging for the HTTP host.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Installs a compact subscriber filtered by `RUST_LOG`, defaulting to `info`.
/// Does nothing when the host already installed one.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .is_err()
    {
        tracing::debug!("global subscriber already installed");
    }
}

/// Emits one event per HTTP exchange, at `warn` for 4xx and 5xx statuses.
pub async fn request_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started_at = Instant::now();

    let response = next.run(request).await;
    let status = response.status().as_u16();
    let elapsed_ms = started_at.elapsed().as_millis();

    if response.status().is_success() || response.status().is_redirection() {
        info!(%method, %path, status, elapsed_ms, "rpc http exchange");
    } else {
        warn!(%method, %path, status, elapsed_ms, "rpc http exchange failed");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::init_logging;

    #[test]
    fn init_logging_tolerates_existing_subscriber() {
        init_logging();
        init_logging();
        tracing::info!("logging initialised twice");
    }
}
