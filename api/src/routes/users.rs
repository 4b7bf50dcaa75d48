//! User creation

use crate::models::CreateUserResponse;
use crate::ApiState;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use std::sync::Arc;

pub fn router() -> Router<Arc<ApiState>> {
    Router::new().route("/new", post(create_user))
}

/// Create a user and return its bearer token
///
/// Unauthenticated. The token is the only credential and is shown once.
#[utoipa::path(
    post,
    path = "/user/new",
    responses(
        (status = 200, description = "User created", body = CreateUserResponse)
    ),
    tag = "users"
)]
pub async fn create_user(State(state): State<Arc<ApiState>>) -> Json<CreateUserResponse> {
    let (token, _tenant) = state.registry.create_user();
    Json(CreateUserResponse {
        token: token.as_str().to_owned(),
    })
}
