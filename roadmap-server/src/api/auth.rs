//! Bearer-token authentication
//!
//! Protected routes run behind `auth_middleware`, which resolves the session
//! token and attaches an `AuthUser` extension for the handler.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use roadmap_common::api::auth::parse_bearer;
use tracing::debug;

use crate::db::sessions;
use crate::{ApiError, ApiResult, AppState};

/// The authenticated caller of a protected route
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub guid: String,
    pub token: String,
}

/// Token from the `Authorization` header, if well formed
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_bearer)
        .map(str::to_string)
}

/// Authentication middleware
///
/// Returns 401 when the header is missing or the session is unknown or
/// expired.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let guid = sessions::resolve(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    debug!("Authenticated request for {}", guid);
    request.extensions_mut().insert(AuthUser { guid, token });

    Ok(next.run(request).await)
}

/// Resolve the caller on a public route where authentication is optional.
///
/// A missing or invalid token yields `None` rather than an error.
pub async fn optional_user(state: &AppState, headers: &HeaderMap) -> ApiResult<Option<String>> {
    match bearer_token(headers) {
        Some(token) => Ok(sessions::resolve(&state.db, &token).await?),
        None => Ok(None),
    }
}
