use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::Notification,
    error::Result,
    repository::NotificationRepository,
};

pub async fn list(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Vec<Notification>>> {
    let notifications = state
        .service_context
        .notification_repo
        .list_for_user(current.user.id)
        .await?;

    Ok(Json(notifications))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state
        .service_context
        .notification_repo
        .mark_read(id, current.user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
