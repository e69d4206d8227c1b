use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    api::state::AppState,
    domain::User,
    error::AppError,
    repository::{SqliteUserRepository, UserRepository},
};

#[derive(Clone)]
pub struct CurrentUser {
    pub user: User,
    pub is_admin: bool,
}

async fn resolve_user(state: &AppState, jar: &CookieJar) -> Result<CurrentUser, AppError> {
    let session_cookie = jar.get("session").ok_or(AppError::Unauthorized)?;

    let session = state
        .service_context
        .auth_service
        .validate_session(session_cookie.value())
        .await?
        .ok_or(AppError::Unauthorized)?;

    let user_repo = SqliteUserRepository::new(state.service_context.db_pool.clone());
    let user = user_repo
        .find_by_id(session.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    // Admin-ness comes from the directory, never from row state.
    let is_admin = state.service_context.admin_directory.is_admin(&user.email);

    Ok(CurrentUser { user, is_admin })
}

pub async fn require_auth(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current = resolve_user(&state, &jar).await?;
    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}

pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let current = resolve_user(&state, &jar).await?;

    if !current.is_admin {
        return Err(AppError::Forbidden);
    }

    request.extensions_mut().insert(current);

    Ok(next.run(request).await)
}
