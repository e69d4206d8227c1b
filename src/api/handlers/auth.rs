use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    api::state::AppState,
    auth::AuthService,
    domain::RegisterUserRequest,
    error::{AppError, Result},
    repository::UserRepository,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>)> {
    req.validate()?;

    let email = req.email.trim().to_lowercase();
    if state
        .service_context
        .user_repo
        .find_by_email(&email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = AuthService::hash_password(&req.password).await?;
    let user = state
        .service_context
        .user_repo
        .create(&email, &req.name, &password_hash)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": user.id, "email": user.email })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let user = state
        .service_context
        .user_repo
        .find_by_email(&req.email.trim().to_lowercase())
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !AuthService::verify_password(&req.password, &user.password_hash).await? {
        return Err(AppError::Unauthorized);
    }

    let (_session, token) = state
        .service_context
        .auth_service
        .create_session(user.id, state.settings.auth.session_duration_hours)
        .await?;

    let cookie = state
        .service_context
        .auth_service
        .create_session_cookie(&token, false);

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            message: "Login successful".to_string(),
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    if let Some(session_cookie) = jar.get("session") {
        let _ = state
            .service_context
            .auth_service
            .invalidate_session(session_cookie.value())
            .await;
    }

    let jar = jar.add(AuthService::create_logout_cookie());

    Ok((jar, StatusCode::NO_CONTENT))
}
