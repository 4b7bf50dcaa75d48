//! Queue endpoints

use crate::error::{ApiError, ApiResult};
use crate::middleware::{ApiJson, AuthTenant};
use crate::models::*;
use crate::ApiState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use kvq_queue::MessageId;
use std::sync::Arc;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/send", post(send_message))
        .route("/receive", post(receive_message))
        .route("/delete", post(delete_message))
}

/// Enqueue a message
#[utoipa::path(
    post,
    path = "/queue/send",
    request_body = QueueSendRequest,
    responses(
        (status = 200, description = "Enqueued", body = QueueSendResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Bad or missing token", body = ErrorResponse)
    ),
    tag = "queue",
    security(("bearer" = []))
)]
pub async fn send_message(
    State(state): State<Arc<ApiState>>,
    AuthTenant(tenant): AuthTenant,
    ApiJson(input): ApiJson<QueueSendRequest>,
) -> ApiResult<Json<QueueSendResponse>> {
    let id = state.queue.send(tenant, &input.namespace, input.message)?;
    Ok(Json(QueueSendResponse {
        id: id.as_str().to_owned(),
    }))
}

/// Lease the oldest visible message
///
/// The message stays hidden for `visibilityTimeout` ms and is offered again
/// afterwards unless deleted.
#[utoipa::path(
    post,
    path = "/queue/receive",
    request_body = QueueReceiveRequest,
    responses(
        (status = 200, description = "Message leased", body = QueueReceiveResponse),
        (status = 404, description = "Nothing visible", body = ErrorResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Bad or missing token", body = ErrorResponse)
    ),
    tag = "queue",
    security(("bearer" = []))
)]
pub async fn receive_message(
    State(state): State<Arc<ApiState>>,
    AuthTenant(tenant): AuthTenant,
    ApiJson(input): ApiJson<QueueReceiveRequest>,
) -> ApiResult<Json<QueueReceiveResponse>> {
    if input.namespace.is_empty() {
        return Err(ApiError::bad_request("namespace must not be empty or missing"));
    }
    let timeout = state.config.visibility_timeout(input.visibility_timeout)?;

    let received = state
        .queue
        .receive(tenant, &input.namespace, timeout)
        .ok_or_else(|| ApiError::queue_empty(&input.namespace))?;

    Ok(Json(QueueReceiveResponse {
        id: received.id.as_str().to_owned(),
        namespace: received.namespace,
        message: received.body,
    }))
}

/// Acknowledge a message; unknown ids succeed
#[utoipa::path(
    post,
    path = "/queue/delete",
    request_body = QueueDeleteRequest,
    responses(
        (status = 200, description = "Deleted or already gone"),
        (status = 401, description = "Bad or missing token", body = ErrorResponse)
    ),
    tag = "queue",
    security(("bearer" = []))
)]
pub async fn delete_message(
    State(state): State<Arc<ApiState>>,
    AuthTenant(tenant): AuthTenant,
    ApiJson(input): ApiJson<QueueDeleteRequest>,
) -> ApiResult<StatusCode> {
    state
        .queue
        .delete(tenant, &input.namespace, &MessageId::from_raw(input.id));
    Ok(StatusCode::OK)
}
