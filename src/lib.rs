//! JSON-RPC 1.0 and 2.0 protocol engine
//!
//! The `protocol` module builds and classifies wire messages, `client`
//! correlates responses with outstanding calls and `server` dispatches
//! inbound payloads to registered procedures. `http` hosts a dispatcher
//! behind axum.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tracing::info;

pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod logging;
pub mod protocol;
pub mod server;

pub use client::{BatchResponse, Client, Transport};
pub use errors::{FaultKind, ProcedureFault, RpcError, TransportError};
pub use protocol::{Call, CallId, ErrorCode, ErrorObject, MessageCodec, Outcome, Params, SpecVersion};
pub use server::{Dispatcher, ProcedureTable};

use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(http::handlers::health))
        .route("/rpc", post(http::handlers::rpc_endpoint))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}

/// Binds the configured socket and serves `procedures` until the listener
/// fails.
pub async fn serve(config: &Config, procedures: ProcedureTable) -> std::io::Result<()> {
    let bind_socket = config
        .bind_socket()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
    let state = AppState::new(Dispatcher::new(config.spec_version, procedures));
    let listener = tokio::net::TcpListener::bind(bind_socket).await?;

    info!(
        bind_addr = %config.bind_addr,
        bind_port = config.bind_port,
        spec_version = %config.spec_version,
        "rpc server starting"
    );

    axum::serve(listener, build_app(state).into_make_service()).await
}
