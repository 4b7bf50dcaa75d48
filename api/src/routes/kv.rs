//! Key-value endpoints

use crate::error::{ApiError, ApiResult};
use crate::middleware::{ApiJson, AuthTenant};
use crate::models::*;
use crate::ApiState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use kvq_common::{KvqError, KvqResult, NO_EXPIRY};
use std::sync::Arc;
use std::time::Duration;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/set", post(set_key))
        .route("/get", post(get_key))
        .route("/delete", post(delete_key))
}

/// `-1` or absent means no expiry; any other negative is rejected
fn parse_ttl(ttl: Option<i64>) -> KvqResult<Option<Duration>> {
    match ttl {
        None | Some(NO_EXPIRY) => Ok(None),
        Some(ms) if ms < 0 => Err(KvqError::validation(format!(
            "ttl must be -1 or >= 0, got {ms}"
        ))),
        Some(ms) => Ok(Some(Duration::from_millis(ms as u64))),
    }
}

/// Store a value, optionally with a TTL
#[utoipa::path(
    post,
    path = "/kv/set",
    request_body = KvSetRequest,
    responses(
        (status = 200, description = "Stored"),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Bad or missing token", body = ErrorResponse)
    ),
    tag = "kv",
    security(("bearer" = []))
)]
pub async fn set_key(
    State(state): State<Arc<ApiState>>,
    AuthTenant(tenant): AuthTenant,
    ApiJson(input): ApiJson<KvSetRequest>,
) -> ApiResult<StatusCode> {
    let ttl = parse_ttl(input.ttl)?;
    state.kv.set(tenant, &input.key, input.value, ttl)?;
    Ok(StatusCode::OK)
}

/// Read a value and its remaining TTL
#[utoipa::path(
    post,
    path = "/kv/get",
    request_body = KvKeyRequest,
    responses(
        (status = 200, description = "Value found", body = KvGetResponse),
        (status = 404, description = "Key missing or expired", body = ErrorResponse),
        (status = 401, description = "Bad or missing token", body = ErrorResponse)
    ),
    tag = "kv",
    security(("bearer" = []))
)]
pub async fn get_key(
    State(state): State<Arc<ApiState>>,
    AuthTenant(tenant): AuthTenant,
    ApiJson(input): ApiJson<KvKeyRequest>,
) -> ApiResult<Json<KvGetResponse>> {
    if input.key.is_empty() {
        return Err(ApiError::bad_request("key must not be empty or missing"));
    }
    let found = state
        .kv
        .get(tenant, &input.key)
        .ok_or_else(|| ApiError::not_found(format!("key {:?} not found", input.key)))?;

    Ok(Json(KvGetResponse {
        key: input.key,
        value: found.value,
        ttl: found.ttl_ms,
    }))
}

/// Remove a key; removing a missing key succeeds
#[utoipa::path(
    post,
    path = "/kv/delete",
    request_body = KvKeyRequest,
    responses(
        (status = 200, description = "Removed or already absent"),
        (status = 401, description = "Bad or missing token", body = ErrorResponse)
    ),
    tag = "kv",
    security(("bearer" = []))
)]
pub async fn delete_key(
    State(state): State<Arc<ApiState>>,
    AuthTenant(tenant): AuthTenant,
    ApiJson(input): ApiJson<KvKeyRequest>,
) -> ApiResult<StatusCode> {
    if input.key.is_empty() {
        return Err(ApiError::bad_request("key must not be empty or missing"));
    }
    let removed = state.kv.remove(tenant, &input.key);
    tracing::debug!(%tenant, key = %input.key, removed, "kv delete");
    Ok(StatusCode::OK)
}
