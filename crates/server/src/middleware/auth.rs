//! Caller identity extraction.
//!
//! Authentication itself happens upstream (the auth gateway terminates the
//! session and forwards the authenticated user's ID). This extractor reads
//! that forwarded identity; requests without it are rejected before any
//! handler logic runs.

use axum::{extract::FromRequestParts, http::request::Parts};

use clementine_core::UserId;

use crate::error::AppError;

/// The HTTP header carrying the authenticated user's ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller, extracted from the forwarded identity header.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized(format!("missing {USER_ID_HEADER} header")))?;

        let user_id = header
            .to_str()
            .ok()
            .and_then(|value| value.parse::<i32>().ok())
            .ok_or_else(|| AppError::Unauthorized(format!("malformed {USER_ID_HEADER} header")))?;

        Ok(Self(UserId::new(user_id)))
    }
}
