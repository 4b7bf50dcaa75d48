//! JSON body extractor with `bad_request` rejections

use crate::error::ApiError;
use axum::extract::FromRequest;

/// `axum::Json` whose rejections become 400 `bad_request`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
