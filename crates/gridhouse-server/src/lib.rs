//! GridHouse Server
//!
//! HTTP surface for the slice service:
//! - `GET /ws` — WebSocket upgrade; the dispatcher in [`ws`] speaks the
//!   JSON protocol from `gridhouse-core`
//! - `GET /health` — liveness plus table dimensions

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use gridhouse_storage::Table;

pub mod ws;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<Table>,
}

/// Build the router with the WebSocket and health endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Liveness probe reporting the table dimensions.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "totalRows": state.table.total_rows(),
        "totalCols": state.table.columns(),
    }))
}
