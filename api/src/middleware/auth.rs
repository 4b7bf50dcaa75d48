//! Bearer token authentication
//!
//! Handlers that take an [`AuthTenant`] only run for requests carrying
//! `Authorization: Bearer <token>` with a registered token. Rejections are
//! 401 and are logged without the token.

use crate::error::ApiError;
use crate::ApiState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use kvq_common::AuthError;
use kvq_tenant::TenantId;
use std::sync::Arc;

/// Tenant resolved from the request's bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthTenant(pub TenantId);

#[async_trait]
impl FromRequestParts<Arc<ApiState>> for AuthTenant {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<ApiState>,
    ) -> Result<Self, Self::Rejection> {
        let resolved = bearer_token(&parts.headers).and_then(|token| state.registry.resolve(token));
        match resolved {
            Ok(tenant) => Ok(Self(tenant)),
            Err(err) => {
                tracing::warn!(path = %parts.uri.path(), reason = %err, "rejected request");
                Err(err.into())
            }
        }
    }
}

/// Pull the token out of an `Authorization: Bearer` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidToken)?;

    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidToken)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidToken);
    }
    Ok(token.trim())
}
