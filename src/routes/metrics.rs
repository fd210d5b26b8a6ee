use axum::{extract::State, http::StatusCode};
use prometheus::{Encoder, TextEncoder};

use crate::{services::metrics::SESSIONS_GAUGE, AppState};

/// GET /metrics — Prometheus scrape endpoint.
pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    SESSIONS_GAUGE.set(state.sessions.len().await as f64);

    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    String::from_utf8(buffer).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
