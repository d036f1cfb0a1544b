//! Identity and idempotency-token extraction.
//!
//! Authentication itself is an external collaborator: requests arrive with
//! a resolved `X-User-Id` header that the components trust without
//! re-validating credentials. Requests without one are rejected before any
//! state is touched.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::{OperationToken, UserId};
use uuid::Uuid;

use crate::error::ApiError;

/// The authenticated user, extracted from the `X-User-Id` header.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get("X-User-Id")
            .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

        let value = value
            .to_str()
            .map_err(|_| ApiError::BadRequest("Unreadable X-User-Id header".to_string()))?;
        let uuid = Uuid::parse_str(value)
            .map_err(|e| ApiError::BadRequest(format!("Invalid X-User-Id: {e}")))?;

        Ok(AuthUser(UserId::from_uuid(uuid)))
    }
}

/// A client-supplied idempotency token, extracted from `X-Request-Id`.
#[derive(Debug, Clone, Copy)]
pub struct RequestToken(pub OperationToken);

impl<S> FromRequestParts<S> for RequestToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get("X-Request-Id")
            .ok_or_else(|| ApiError::BadRequest("Missing X-Request-Id header".to_string()))?;

        let value = value
            .to_str()
            .map_err(|_| ApiError::BadRequest("Unreadable X-Request-Id header".to_string()))?;
        let uuid = Uuid::parse_str(value)
            .map_err(|e| ApiError::BadRequest(format!("Invalid X-Request-Id: {e}")))?;

        Ok(RequestToken(OperationToken::from_uuid(uuid)))
    }
}
