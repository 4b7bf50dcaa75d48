//! Health check endpoint

use crate::models::HealthResponse;
use crate::ApiState;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;

/// Health check with engine counters
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let queue = state.queue.stats();
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        tenants: state.registry.tenant_count(),
        kv_entries: state.kv.len(),
        queue_namespaces: queue.namespaces,
        messages_visible: queue.visible,
        messages_leased: queue.leased,
    })
}
