//! Actor extraction from request headers.
//!
//! The real deployment fronts this service with session middleware; the
//! reference server reads the already-resolved identity from
//! `x-user-id` / `x-user-role` headers.

use crate::api::envelope::ApiError;
use crate::auth::{Actor, Role};
use crate::error::AppError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError(AppError::Forbidden("missing x-user-id header".into())))?;
        let user_id = Uuid::parse_str(user_id)
            .map_err(|_| ApiError(AppError::Forbidden("invalid x-user-id header".into())))?;

        let role = parts
            .headers
            .get("x-user-role")
            .and_then(|v| v.to_str().ok())
            .and_then(Role::from_str)
            .unwrap_or(Role::User);

        Ok(Actor::new(user_id, role))
    }
}
