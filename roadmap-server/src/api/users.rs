//! Registration, login and account endpoints

use axum::{extract::State, http::StatusCode, Extension, Json};
use roadmap_common::db::UserAccount;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::AuthUser;
use crate::db::{responses, sessions, users};
use crate::db::responses::Progress;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    #[serde(alias = "username", alias = "email")]
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserAccount,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: UserAccount,
    pub progress: Progress,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let account = users::create_user(&state.db, &req.username, &req.email, &req.password).await?;
    let token = sessions::issue(&state.db, &account.guid).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: account.guid,
            username: account.username,
            email: account.email,
            token,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    if req.login.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Login and password are required".to_string(),
        ));
    }

    let Some(user) = users::authenticate(&state.db, &req.login, &req.password).await? else {
        warn!("Rejected login for '{}'", req.login.trim());
        return Err(ApiError::Unauthorized("Invalid login or password".to_string()));
    };

    let token = sessions::issue(&state.db, &user.guid).await?;
    info!("User {} logged in", user.username);

    Ok(Json(LoginResponse { token, user }))
}

/// GET /api/auth/profile
pub async fn profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = users::find_by_guid(&state.db, &auth.guid)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    let progress = responses::progress(&state.db, &auth.guid).await?;

    Ok(Json(ProfileResponse { user, progress }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Json<Value>> {
    sessions::revoke(&state.db, &auth.token).await?;
    Ok(Json(json!({ "message": "Logged out" })))
}
