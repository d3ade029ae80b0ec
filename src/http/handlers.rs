//! Axum HTTP handlers for the web server

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub spec_version: &'static str,
    pub procedures: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        spec_version: state.dispatcher.spec().as_str(),
        procedures: state.dispatcher.procedures().len(),
    })
}

pub async fn rpc_endpoint(State(state): State<AppState>, body: Bytes) -> Response {
    match state.dispatcher.dispatch(&body) {
        Some(payload) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            payload,
        )
            .into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}
