use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{ChatMessage, SendMessageRequest},
    error::Result,
};

#[derive(Debug, Deserialize)]
pub struct PollParams {
    /// Only return messages created strictly after this instant.
    pub after: Option<DateTime<Utc>>,
}

pub async fn conversation(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((item_id, peer_id)): Path<(Uuid, Uuid)>,
    Query(params): Query<PollParams>,
) -> Result<Json<Vec<ChatMessage>>> {
    let messages = state
        .service_context
        .chat_service
        .conversation(item_id, current.user.id, peer_id, params.after)
        .await?;

    Ok(Json(messages))
}

pub async fn send(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path((item_id, peer_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<ChatMessage>)> {
    let message = state
        .service_context
        .chat_service
        .send(item_id, current.user.id, peer_id, request)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}
