//! Caller identity extractors
//!
//! Authentication happens upstream: the gateway in front of the service
//! verifies the session and forwards the user's id in the `x-user-id` header.
//! These extractors only read that header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::errors::ApiError;

/// Header carrying the authenticated user's id
pub const USER_ID_HEADER: &str = "x-user-id";

fn user_id_from_parts(parts: &Parts) -> Result<Option<i32>, ApiError> {
    let Some(value) = parts.headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i32>().ok())
        .map(Some)
        .ok_or_else(|| ApiError::InvalidInput(format!("{} must be an integer user id", USER_ID_HEADER)))
}

/// The caller of a public endpoint, possibly anonymous
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Caller {
    pub user_id: Option<i32>,
}

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller {
            user_id: user_id_from_parts(parts)?,
        })
    }
}

/// An authenticated caller; requests without an identity are rejected with 401
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i32,
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = user_id_from_parts(parts)?.ok_or(ApiError::Unauthorized)?;
        Ok(AuthUser { user_id })
    }
}
